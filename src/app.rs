use crate::ui_theme::StudioTheme;
use eframe::egui;
use chrono::Local;
use egui_extras::{Column, TableBuilder};
use image::{DynamicImage, RgbImage};
use image_junction::analyzer::flatten_on_white;
use image_junction::archive::{build_archive, DEFAULT_ARCHIVE_NAME};
use image_junction::assets::AssetClient;
use image_junction::batch::{Batch, ItemStatus};
use image_junction::buffer::BufferTable;
use image_junction::compose::{ComposeOptions, LogoOverlay};
use image_junction::config::AppConfig;
use image_junction::platform::{find_platform, same_platform, PlatformSpec};
use image_junction::worker::{self, BatchJob, WorkerEvent};
use log::{error, info, warn};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use uuid::Uuid;

const MAX_LOGS: usize = 1000;
const PREVIEW_MAX_SIDE: u32 = 512;
const ACCEPTED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

#[derive(Debug, PartialEq, Default)]
enum AssetsStatus {
    #[default]
    NotLoaded,
    Loading,
    Ready,
    Failed(String),
}

#[derive(Default)]
struct ItemPreview {
    before: Option<egui::TextureHandle>,
    after: Option<egui::TextureHandle>,
}

pub struct JunctionApp {
    // Configuration
    config: AppConfig,
    config_path: PathBuf,

    // Sidebar state
    selected_platform: String,
    previous_platform: String,
    selected_product: Option<String>,
    buffer_table: BufferTable,
    assets_status: AssetsStatus,
    advanced_setting: bool,
    adv_buffer1: i64,
    adv_buffer2: i64,
    tolerance: u8,
    jpeg_quality: u8,
    logo_enabled: bool,
    logo_path: Option<PathBuf>,
    logo_height: u32,
    logo_x: i64,
    logo_y: i64,

    // Session
    batch: Batch,
    previews: HashMap<Uuid, ItemPreview>,
    is_processing: bool,
    logs: Vec<String>,

    // Core components
    ctx: egui::Context,
    asset_client: Arc<AssetClient>,
    runtime: tokio::runtime::Runtime,
    event_sender: mpsc::UnboundedSender<WorkerEvent>,
    event_receiver: mpsc::UnboundedReceiver<WorkerEvent>,

    theme: StudioTheme,
}

impl JunctionApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Result<Self, std::io::Error> {
        let runtime = tokio::runtime::Runtime::new()?;
        let (event_sender, event_receiver) = mpsc::unbounded_channel();

        let config_path = AppConfig::default_path();
        let config = AppConfig::load(&config_path);

        let mut app = Self {
            selected_platform: config.selected_platform.clone(),
            previous_platform: config.selected_platform.clone(),
            selected_product: config.selected_product.clone(),
            buffer_table: BufferTable::default(),
            assets_status: AssetsStatus::NotLoaded,
            advanced_setting: config.advanced_setting,
            adv_buffer1: config.advanced_buffer1,
            adv_buffer2: config.advanced_buffer2,
            tolerance: config.tolerance,
            jpeg_quality: config.jpeg_quality,
            logo_enabled: config.logo.enabled,
            logo_path: config.logo.path.as_ref().map(PathBuf::from),
            logo_height: config.logo.height,
            logo_x: config.logo.x,
            logo_y: config.logo.y,
            batch: Batch::new(),
            previews: HashMap::new(),
            is_processing: false,
            logs: Vec::new(),
            ctx: cc.egui_ctx.clone(),
            asset_client: Arc::new(AssetClient::new()),
            runtime,
            event_sender,
            event_receiver,
            theme: StudioTheme::default(),
            config,
            config_path,
        };
        app.refresh_assets(false);
        Ok(app)
    }

    fn log(&mut self, message: impl Into<String>) {
        self.logs.push(message.into());
        if self.logs.len() > MAX_LOGS {
            let remove_count = self.logs.len() - MAX_LOGS;
            self.logs.drain(0..remove_count);
        }
    }

    fn current_platform(&self) -> Option<PlatformSpec> {
        find_platform(&self.config.platforms, &self.selected_platform)
            .ok()
            .cloned()
    }

    fn save_config(&mut self) {
        self.config.selected_platform = self.selected_platform.clone();
        self.config.selected_product = self.selected_product.clone();
        self.config.advanced_setting = self.advanced_setting;
        self.config.advanced_buffer1 = self.adv_buffer1;
        self.config.advanced_buffer2 = self.adv_buffer2;
        self.config.tolerance = self.tolerance;
        self.config.jpeg_quality = self.jpeg_quality;
        self.config.logo.enabled = self.logo_enabled;
        self.config.logo.path = self
            .logo_path
            .as_ref()
            .map(|p| p.to_string_lossy().to_string());
        self.config.logo.height = self.logo_height;
        self.config.logo.x = self.logo_x;
        self.config.logo.y = self.logo_y;

        if let Err(e) = self.config.save(&self.config_path) {
            error!("Failed to save config: {}", e);
            self.log(format!("❌ Failed to save config: {}", e));
        }
    }

    /// Loads the selected platform's assets in the background. `reload`
    /// drops the cached copy first.
    fn refresh_assets(&mut self, reload: bool) {
        let Some(platform) = self.current_platform() else {
            self.assets_status = AssetsStatus::Failed(format!(
                "No template configured for '{}'",
                self.selected_platform
            ));
            return;
        };

        self.assets_status = AssetsStatus::Loading;
        self.buffer_table = BufferTable::default();
        self.log(format!("Loading assets for {} ({})", platform.name, platform.code));

        let client = self.asset_client.clone();
        let sender = self.event_sender.clone();
        self.runtime.spawn(async move {
            if reload {
                client.invalidate(&platform.code).await;
            }
            worker::load_products(client, platform, sender).await
        });
    }

    fn add_images(&mut self) {
        let mut dialog = rfd::FileDialog::new().add_filter("Images", &ACCEPTED_EXTENSIONS);
        if let Some(folder) = &self.config.last_input_folder {
            dialog = dialog.set_directory(folder);
        }
        let Some(paths) = dialog.pick_files() else {
            return;
        };

        if let Some(parent) = paths.first().and_then(|p| p.parent()) {
            self.config.last_input_folder = Some(parent.to_string_lossy().to_string());
        }

        for path in paths {
            match image::open(&path) {
                Ok(img) => {
                    let (width, height) = (img.width(), img.height());
                    match self.batch.add_file(path.clone(), width, height) {
                        Some(id) => {
                            let before = flatten_on_white(&img);
                            let texture = self.load_texture(&format!("before-{}", id), &before);
                            self.previews.insert(
                                id,
                                ItemPreview {
                                    before: Some(texture),
                                    after: None,
                                },
                            );
                            self.log(format!(
                                "➕ Added: {} (width {}, height {})",
                                display_name(&path),
                                width,
                                height
                            ));
                        }
                        None => self.log(format!("⚠ Already added: {}", display_name(&path))),
                    }
                }
                Err(e) => {
                    warn!("Could not open {}: {}", path.display(), e);
                    self.log(format!("❌ Could not open {}: {}", display_name(&path), e));
                }
            }
        }
        self.save_config();
    }

    fn clear_images(&mut self) {
        self.batch.clear();
        self.previews.clear();
        self.log("Cleared all images");
    }

    fn select_logo(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Images", &ACCEPTED_EXTENSIONS)
            .pick_file()
        {
            self.log(format!("Selected logo: {}", path.display()));
            self.logo_path = Some(path);
            self.save_config();
        }
    }

    fn build_logo(&mut self) -> Result<Option<LogoOverlay>, String> {
        if !self.logo_enabled {
            return Ok(None);
        }
        let path = self
            .logo_path
            .clone()
            .ok_or_else(|| "Logo is enabled but no logo file is selected".to_string())?;
        let image = image::open(&path)
            .map_err(|e| format!("Could not open logo {}: {}", path.display(), e))?;
        Ok(Some(LogoOverlay {
            image: image.to_rgba8(),
            height: self.logo_height,
            x: self.logo_x,
            y: self.logo_y,
        }))
    }

    fn start_processing(&mut self) {
        if self.batch.is_empty() {
            self.log("Please upload at least one image to proceed.");
            return;
        }
        let Some(platform) = self.current_platform() else {
            self.log(format!("❌ Unknown platform '{}'", self.selected_platform));
            return;
        };
        let product_type = match (&self.selected_product, self.advanced_setting) {
            (Some(product), _) => product.clone(),
            (None, true) => String::new(),
            (None, false) => {
                self.log("Please select a product type first");
                return;
            }
        };
        let logo = match self.build_logo() {
            Ok(logo) => logo,
            Err(msg) => {
                self.log(format!("❌ {}", msg));
                return;
            }
        };

        self.save_config();
        self.batch.reset_all();
        for preview in self.previews.values_mut() {
            preview.after = None;
        }

        let job = BatchJob {
            items: self
                .batch
                .items()
                .iter()
                .map(|item| (item.id, item.file_path.clone()))
                .collect(),
            platform: platform.clone(),
            product_type,
            manual: self
                .advanced_setting
                .then_some((self.adv_buffer1, self.adv_buffer2)),
            options: ComposeOptions {
                tolerance: self.tolerance,
                logo,
                ..ComposeOptions::default()
            },
        };

        info!(
            "Processing {} images for {}",
            job.items.len(),
            platform.code
        );
        self.log(format!(
            "🚀 Processing {} images for {}",
            job.items.len(),
            platform.name
        ));
        self.is_processing = true;

        let client = self.asset_client.clone();
        let sender = self.event_sender.clone();
        self.runtime
            .spawn(async move { worker::run_batch(client, job, sender).await });
    }

    fn save_archive(&mut self) {
        let Some(platform) = self.current_platform() else {
            return;
        };
        if self.batch.completed().next().is_none() {
            self.log("Please upload at least one image to proceed.");
            return;
        }

        let archive = build_archive(
            self.batch
                .completed()
                .map(|(item, result)| (item.file_name.as_str(), result)),
            &platform.archive_suffix,
            self.jpeg_quality,
        );
        let bytes = match archive {
            Ok(bytes) => bytes,
            Err(e) => {
                self.log(format!("❌ Failed to build archive: {}", e));
                return;
            }
        };

        let mut dialog = rfd::FileDialog::new()
            .add_filter("ZIP archive", &["zip"])
            .set_file_name(DEFAULT_ARCHIVE_NAME);
        if let Some(folder) = &self.config.last_output_folder {
            dialog = dialog.set_directory(folder);
        }
        let Some(path) = dialog.save_file() else {
            return;
        };

        match fs::write(&path, bytes) {
            Ok(()) => {
                self.log(format!("💾 Saved archive to {}", path.display()));
                self.config.last_output_folder = path
                    .parent()
                    .map(|p| p.to_string_lossy().to_string());
                self.save_config();
            }
            Err(e) => self.log(format!("❌ Failed to save {}: {}", path.display(), e)),
        }
    }

    fn load_texture(&self, name: &str, image: &RgbImage) -> egui::TextureHandle {
        let (w, h) = image.dimensions();
        let scale = (PREVIEW_MAX_SIDE as f64 / w.max(h) as f64).min(1.0);
        let (tw, th) = (
            ((w as f64 * scale) as u32).max(1),
            ((h as f64 * scale) as u32).max(1),
        );
        let rgba = DynamicImage::ImageRgb8(image::imageops::thumbnail(image, tw, th)).to_rgba8();
        let color_image =
            egui::ColorImage::from_rgba_unmultiplied([tw as usize, th as usize], rgba.as_raw());
        self.ctx
            .load_texture(name, color_image, egui::TextureOptions::LINEAR)
    }

    fn handle_events(&mut self) {
        while let Ok(event) = self.event_receiver.try_recv() {
            match event {
                WorkerEvent::Log(message) => self.log(message),
                WorkerEvent::AssetsLoaded { code, table } => {
                    if !same_platform(&code, &self.selected_platform) {
                        continue;
                    }
                    let products = table.products();
                    let keep = self
                        .selected_product
                        .as_deref()
                        .is_some_and(|p| products.contains(&p));
                    if !keep {
                        self.selected_product = products.first().map(|p| p.to_string());
                    }
                    self.log(format!("✅ {} assets ready ({} product types)", code, products.len()));
                    self.buffer_table = table;
                    self.assets_status = AssetsStatus::Ready;
                }
                WorkerEvent::AssetsFailed { code, error } => {
                    if same_platform(&code, &self.selected_platform) {
                        self.log(format!("❌ Failed to load {} assets: {}", code, error));
                        self.assets_status = AssetsStatus::Failed(error);
                    }
                }
                WorkerEvent::ItemStarted(id) => {
                    if let Some(item) = self.batch.get_item_mut(id) {
                        item.start_processing();
                    }
                }
                WorkerEvent::ItemCompleted(id, result) => {
                    let texture = self.load_texture(&format!("after-{}", id), &result);
                    self.previews.entry(id).or_default().after = Some(texture);
                    if let Some(item) = self.batch.get_item_mut(id) {
                        item.complete(result);
                    }
                }
                WorkerEvent::ItemFailed(id, message) => {
                    if let Some(item) = self.batch.get_item_mut(id) {
                        item.fail(message);
                    }
                }
                WorkerEvent::Finished { completed, failed } => {
                    self.is_processing = false;
                    self.log(format!(
                        "🏁 Finished: {} completed, {} failed",
                        completed, failed
                    ));
                }
            }
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

impl eframe::App for JunctionApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.theme.apply_to_ctx(ctx);
        self.handle_events();

        if self.selected_platform != self.previous_platform {
            self.previous_platform = self.selected_platform.clone();
            self.save_config();
            self.refresh_assets(false);
        }

        egui::SidePanel::left("options_panel")
            .resizable(false)
            .exact_width(260.0)
            .show(ctx, |ui| self.show_options(ui));

        egui::TopBottomPanel::bottom("logs_panel")
            .resizable(true)
            .min_height(110.0)
            .show(ctx, |ui| self.show_logs(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("IMAGE JUNCTION Batch");
            ui.add_space(self.theme.spacing_medium);
            self.show_actions(ui);
            ui.add_space(self.theme.spacing_medium);
            self.show_items(ui);
        });

        if self.is_processing || self.assets_status == AssetsStatus::Loading {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}

impl JunctionApp {
    fn show_options(&mut self, ui: &mut egui::Ui) {
        ui.add_space(self.theme.spacing_large);
        ui.label(
            egui::RichText::new("Select Options")
                .size(18.0)
                .strong()
                .color(self.theme.text_primary),
        );
        ui.add_space(self.theme.spacing_medium);

        let codes: Vec<(String, String)> = self
            .config
            .platforms
            .iter()
            .map(|p| (p.code.clone(), p.name.clone()))
            .collect();
        egui::ComboBox::from_label("For")
            .selected_text(self.selected_platform.clone())
            .show_ui(ui, |ui| {
                for (code, name) in &codes {
                    ui.selectable_value(
                        &mut self.selected_platform,
                        code.clone(),
                        format!("{} ({})", code, name),
                    );
                }
            });

        ui.horizontal(|ui| {
            match &self.assets_status {
                AssetsStatus::NotLoaded => {
                    ui.label(egui::RichText::new("Not loaded").color(self.theme.text_muted));
                }
                AssetsStatus::Loading => {
                    ui.spinner();
                    ui.label(egui::RichText::new("Loading...").color(self.theme.text_muted));
                }
                AssetsStatus::Ready => {
                    ui.label(egui::RichText::new("✅ Assets ready").color(self.theme.success));
                }
                AssetsStatus::Failed(msg) => {
                    ui.label(egui::RichText::new("❌ Assets failed").color(self.theme.error))
                        .on_hover_text(msg.as_str());
                }
            }
            if ui.small_button("Reload").clicked() {
                self.refresh_assets(true);
            }
        });
        ui.add_space(self.theme.spacing_medium);

        let products: Vec<String> = self
            .buffer_table
            .products()
            .into_iter()
            .map(String::from)
            .collect();
        ui.add_enabled_ui(!self.advanced_setting, |ui| {
            egui::ComboBox::from_label("Product")
                .selected_text(self.selected_product.clone().unwrap_or_default())
                .show_ui(ui, |ui| {
                    for product in &products {
                        ui.selectable_value(
                            &mut self.selected_product,
                            Some(product.clone()),
                            product.as_str(),
                        );
                    }
                });
        });

        ui.add_space(self.theme.spacing_medium);
        ui.checkbox(&mut self.advanced_setting, "Advanced setting");
        if self.advanced_setting {
            ui.horizontal(|ui| {
                ui.label("Top offset");
                ui.add(egui::DragValue::new(&mut self.adv_buffer1).range(-2000..=2000));
            });
            ui.horizontal(|ui| {
                ui.label("Height");
                ui.add(egui::DragValue::new(&mut self.adv_buffer2).range(1..=4000));
            });
        }

        ui.add_space(self.theme.spacing_medium);
        ui.add(egui::Slider::new(&mut self.tolerance, 0..=60).text("White tolerance"));
        ui.add(egui::Slider::new(&mut self.jpeg_quality, 10..=100).text("JPEG quality"));

        ui.add_space(self.theme.spacing_medium);
        ui.checkbox(&mut self.logo_enabled, "Logo");
        if self.logo_enabled {
            ui.horizontal(|ui| {
                let label = self
                    .logo_path
                    .as_deref()
                    .map(display_name)
                    .unwrap_or_else(|| "No logo selected".to_string());
                ui.label(egui::RichText::new(label).color(self.theme.text_secondary));
                if ui.small_button("Choose").clicked() {
                    self.select_logo();
                }
            });
            ui.horizontal(|ui| {
                ui.label("Size");
                ui.add(egui::DragValue::new(&mut self.logo_height).range(10..=1000));
                ui.label("X");
                ui.add(egui::DragValue::new(&mut self.logo_x).range(10..=1000));
                ui.label("Y");
                ui.add(egui::DragValue::new(&mut self.logo_y).range(10..=1000));
            });
        }

        ui.add_space(self.theme.spacing_large);
        egui::CollapsingHeader::new("Offset table").show(ui, |ui| {
            if self.buffer_table.is_empty() {
                ui.label(egui::RichText::new("No table loaded").color(self.theme.text_muted));
                return;
            }
            TableBuilder::new(ui)
                .striped(true)
                .column(Column::remainder())
                .column(Column::auto())
                .column(Column::auto())
                .header(20.0, |mut header| {
                    header.col(|ui| {
                        ui.strong("product");
                    });
                    header.col(|ui| {
                        ui.strong("buffer1");
                    });
                    header.col(|ui| {
                        ui.strong("buffer2");
                    });
                })
                .body(|mut body| {
                    for entry in self.buffer_table.entries() {
                        body.row(18.0, |mut row| {
                            row.col(|ui| {
                                ui.label(&entry.product);
                            });
                            row.col(|ui| {
                                ui.label(format!("{}", entry.buffer1));
                            });
                            row.col(|ui| {
                                ui.label(format!("{}", entry.buffer2));
                            });
                        });
                    }
                });
        });
    }

    fn show_actions(&mut self, ui: &mut egui::Ui) {
        let frame = self.theme.card_frame();
        frame.show(ui, |ui| {
            ui.horizontal(|ui| {
                if ui
                    .add_enabled(!self.is_processing, egui::Button::new("Upload Files"))
                    .on_hover_text("Accepts jpg, jpeg and png. Rename files before uploading.")
                    .clicked()
                {
                    self.add_images();
                }
                if ui
                    .add_enabled(!self.is_processing, egui::Button::new("Clear"))
                    .clicked()
                {
                    self.clear_images();
                }

                let can_process = !self.is_processing
                    && !self.batch.is_empty()
                    && self.assets_status == AssetsStatus::Ready;
                let process = egui::Button::new(
                    egui::RichText::new("Process")
                        .strong()
                        .color(self.theme.text_primary),
                )
                .fill(self.theme.accent);
                if ui.add_enabled(can_process, process).clicked() {
                    self.start_processing();
                }
                if self.is_processing {
                    ui.spinner();
                }

                let stats = self.batch.stats();
                if ui
                    .add_enabled(
                        !self.is_processing && stats.completed > 0,
                        egui::Button::new("Download All Images as ZIP"),
                    )
                    .clicked()
                {
                    self.save_archive();
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(
                        egui::RichText::new(format!(
                            "{} total · {} done · {} failed",
                            stats.total, stats.completed, stats.failed
                        ))
                        .color(self.theme.text_muted),
                    );
                });
            });
        });
    }

    fn show_items(&mut self, ui: &mut egui::Ui) {
        if self.batch.is_empty() {
            ui.centered_and_justified(|ui| {
                ui.label(
                    egui::RichText::new("Please upload at least one image to proceed.")
                        .color(self.theme.text_muted),
                );
            });
            return;
        }

        let mut to_remove = Vec::new();
        egui::ScrollArea::vertical()
            .id_salt("items_scroll")
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                for item in self.batch.items() {
                    self.theme.card_frame().show(ui, |ui| {
                        ui.horizontal(|ui| {
                            ui.label(
                                egui::RichText::new(&item.file_name)
                                    .strong()
                                    .color(self.theme.text_primary),
                            );
                            ui.label(
                                egui::RichText::new(format!(
                                    "width {} height {}",
                                    item.width, item.height
                                ))
                                .color(self.theme.text_muted),
                            );
                            let (status, color) = self.theme.status_label(&item.status);
                            ui.label(egui::RichText::new(status).color(color));
                            let timing = match item.processing_time() {
                                Some(elapsed) => format!(
                                    "added {} · {:.2}s",
                                    item.added_at.with_timezone(&Local).format("%H:%M:%S"),
                                    elapsed.num_milliseconds() as f64 / 1000.0
                                ),
                                None => format!(
                                    "added {}",
                                    item.added_at.with_timezone(&Local).format("%H:%M:%S")
                                ),
                            };
                            ui.label(
                                egui::RichText::new(timing)
                                    .small()
                                    .color(self.theme.text_muted),
                            );
                            if !self.is_processing
                                && !matches!(item.status, ItemStatus::Processing)
                                && ui.small_button("Remove").clicked()
                            {
                                to_remove.push(item.id);
                            }
                        });

                        if let Some(preview) = self.previews.get(&item.id) {
                            ui.columns(2, |columns| {
                                show_preview(
                                    &mut columns[0],
                                    "Before",
                                    preview.before.as_ref(),
                                    self.theme.preview_width,
                                );
                                show_preview(
                                    &mut columns[1],
                                    "After",
                                    preview.after.as_ref(),
                                    self.theme.preview_width,
                                );
                            });
                        }
                    });
                    ui.add_space(self.theme.spacing_small);
                }
            });

        for id in to_remove {
            self.batch.remove_item(id);
            self.previews.remove(&id);
        }
    }

    fn show_logs(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(
                egui::RichText::new("Logs")
                    .size(16.0)
                    .strong()
                    .color(self.theme.text_primary),
            );
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.small_button("Clear").clicked() {
                    self.logs.clear();
                }
            });
        });
        egui::ScrollArea::vertical()
            .id_salt("logs_scroll")
            .stick_to_bottom(true)
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                for (i, log) in self.logs.iter().enumerate() {
                    ui.horizontal_wrapped(|ui| {
                        ui.label(
                            egui::RichText::new(format!("{:>3}", i + 1))
                                .size(10.0)
                                .color(self.theme.text_muted),
                        );
                        ui.label(
                            egui::RichText::new(log)
                                .size(12.0)
                                .color(self.theme.text_secondary),
                        );
                    });
                }
            });
    }
}

fn show_preview(
    ui: &mut egui::Ui,
    caption: &str,
    texture: Option<&egui::TextureHandle>,
    max_width: f32,
) {
    ui.vertical_centered(|ui| {
        match texture {
            Some(texture) => {
                ui.add(egui::Image::new(texture).max_width(max_width));
            }
            None => {
                ui.add_space(24.0);
                ui.weak("No preview");
            }
        }
        ui.small(caption);
    });
}
