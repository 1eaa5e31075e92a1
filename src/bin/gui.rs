//! The desktop window for fetching and downloading videos.

use clap::Parser;
use eframe::egui::{self, Color32, ColorImage, TextureHandle, TextureOptions, Visuals};
use eframe::{App, Frame};
use once_cell::sync::OnceCell;
use rfd::FileDialog;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;
use tubegrab::controller::Update;
use tubegrab::lang::{Language, StatusLine, Tone, ENGLISH};
use tubegrab::{Controller, MediaFormat, YoutubeProvider};

// The runtime outlives the window, so background work is never torn down
// mid-download by a frame ending.
static RUNTIME: OnceCell<Arc<Runtime>> = OnceCell::new();

#[derive(Parser)]
struct Args {
    /// Path to the yt-dlp binary used to resolve videos.
    #[arg(long = "yt-dlp", default_value = "yt-dlp")]
    yt_dlp: PathBuf,
}

fn main() -> Result<(), eframe::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let runtime = Arc::new(Runtime::new().expect("failed to start the runtime"));
    RUNTIME.set(runtime.clone()).expect("runtime already set");

    let provider = Arc::new(YoutubeProvider::new(args.yt_dlp));
    let controller = Controller::new(provider, runtime.handle().clone());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([560.0, 640.0]),
        ..Default::default()
    };
    eframe::run_native(
        ENGLISH.title,
        options,
        Box::new(|cc| {
            cc.egui_ctx.set_visuals(Visuals::dark());
            Box::new(DownloaderApp::new(controller))
        }),
    )
}

struct DownloaderApp {
    controller: Controller,
    url_input: String,
    format: MediaFormat,
    status: StatusLine,
    thumbnail: Option<TextureHandle>,
    speed: f64,
    batch_counts: (usize, usize),
}

impl DownloaderApp {
    fn new(controller: Controller) -> Self {
        Self {
            controller,
            url_input: String::new(),
            format: MediaFormat::default(),
            status: StatusLine::default(),
            thumbnail: None,
            speed: 0.0,
            batch_counts: (0, 0),
        }
    }

    fn apply(&mut self, ctx: &egui::Context, update: Update) {
        match update {
            Update::Status(line) => self.status = line,
            Update::Thumbnail(image) => {
                self.thumbnail = image.map(|image| {
                    let size = [image.width, image.height];
                    let pixels = ColorImage::from_rgba_unmultiplied(size, &image.rgba);
                    ctx.load_texture("thumbnail", pixels, TextureOptions::default())
                });
            }
            Update::Speed(rate) => self.speed = rate,
            Update::BatchCount { done, total } => self.batch_counts = (done, total),
        }
    }
}

impl App for DownloaderApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        for update in self.controller.poll() {
            self.apply(ctx, update);
        }

        let messages = self.controller.messages();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading(messages.title);
            });
            ui.add_space(12.0);

            ui.horizontal(|ui| {
                ui.label(messages.url_label);
                let response = ui.text_edit_singleline(&mut self.url_input);
                if response.changed() {
                    self.controller.input_changed(&self.url_input);
                }
            });

            let color = match self.status.tone {
                Tone::Neutral => ui.visuals().text_color(),
                Tone::Success => Color32::GREEN,
                Tone::Error => Color32::RED,
            };
            ui.colored_label(color, &self.status.text);
            ui.add_space(8.0);

            if let Some(texture) = &self.thumbnail {
                ui.vertical_centered(|ui| {
                    ui.image(texture);
                });
                ui.add_space(8.0);
            }

            ui.horizontal(|ui| {
                ui.label(messages.format_label);
                for format in MediaFormat::ALL {
                    if ui
                        .radio_value(&mut self.format, format, format.label())
                        .changed()
                    {
                        self.controller.set_format(self.format);
                    }
                }
            });
            ui.add_space(8.0);

            if ui.button(messages.location_button).clicked() {
                let directory = FileDialog::new().pick_folder();
                self.controller.destination_chosen(directory);
            }
            if ui.button(messages.download_button).clicked() {
                self.controller.download_requested();
            }
            if ui.button(messages.file_download_button).clicked() {
                let file = FileDialog::new()
                    .add_filter("Text files", &["txt"])
                    .pick_file();
                self.controller.batch_requested(file);
            }
            ui.add_space(8.0);

            ui.label(messages.speed_readout(self.speed));
            ui.label(messages.videos_readout(self.batch_counts.0, self.batch_counts.1));
            ui.add_space(8.0);

            let mut language = self.controller.language();
            egui::ComboBox::from_label("")
                .selected_text(language.label())
                .show_ui(ui, |ui| {
                    for option in Language::ALL {
                        ui.selectable_value(&mut language, option, option.label());
                    }
                });
            if language != self.controller.language() {
                self.controller.set_language(language);
            }
        });

        // Worker events keep arriving while the window is idle.
        ctx.request_repaint_after(Duration::from_millis(100));
    }
}
