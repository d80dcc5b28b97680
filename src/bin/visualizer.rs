// src/bin/visualizer.rs

use agentic_market::telemetry::init_tracing;
use agentic_market::{MarketModel, SimConfig, SimError};
use eframe::egui;
use egui::{Color32, FontId, Frame, ProgressBar, RichText, Stroke};
use egui_plot::{Legend, Line, Plot, PlotPoints};
use std::time::{Duration, Instant};
use tracing::Level;

struct VisualizerApp {
    // World state
    config: SimConfig,
    model: Option<MarketModel>,
    error: Option<String>,

    // --- State for Multi-Run ---
    run_price_histories: Vec<Vec<f64>>,
    current_run_history: Vec<f64>,
    current_holdings_history: Vec<f64>,

    // --- State for non-blocking Batch Mode ---
    num_runs_to_batch: usize,
    is_batch_running: bool,
    batch_runs_done: usize,
    base_seed: u64,

    // UI state for the app itself
    is_playing: bool,
    last_update: Instant,
}

impl VisualizerApp {
    fn new(config: SimConfig) -> Self {
        let base_seed = config.price.seed.unwrap_or(42);
        let mut app = Self {
            config,
            model: None,
            error: None,
            run_price_histories: Vec::new(),
            current_run_history: Vec::new(),
            current_holdings_history: Vec::new(),
            num_runs_to_batch: 100,
            is_batch_running: false,
            batch_runs_done: 0,
            base_seed,
            is_playing: false,
            last_update: Instant::now(),
        };
        app.start_new_run();
        app
    }

    fn build_model(&self, seed: u64) -> Result<MarketModel, SimError> {
        let mut config = self.config.clone();
        config.price.seed = Some(seed);
        MarketModel::new(config)
    }

    fn start_new_run(&mut self) {
        if self.current_run_history.len() > 1 {
            self.run_price_histories
                .push(std::mem::take(&mut self.current_run_history));
        }
        let seed = self.base_seed + self.run_price_histories.len() as u64;
        match self.build_model(seed) {
            Ok(model) => {
                self.current_run_history = vec![model.state().price()];
                self.current_holdings_history = vec![self.config.agents.initial_holdings];
                self.model = Some(model);
                self.error = None;
            }
            Err(err) => {
                self.model = None;
                self.error = Some(err.to_string());
            }
        }
        self.is_playing = false;
    }

    fn clear_all_runs(&mut self) {
        self.run_price_histories.clear();
        self.current_run_history.clear();
        self.start_new_run();
    }

    fn run_batch_simulations(&mut self) {
        self.clear_all_runs(); // Start from a clean slate
        self.is_playing = false;
        self.batch_runs_done = 0;
        self.is_batch_running = true;
    }

    // One whole run, seeded so a batch is reproducible.
    fn simulate_path(&self, seed: u64) -> Result<Vec<f64>, SimError> {
        let record = self.build_model(seed)?.run(self.config.num_steps)?;
        let mut path = Vec::with_capacity(record.len() + 1);
        path.push(self.config.price.initial_price);
        path.extend(record.prices());
        Ok(path)
    }

    fn advance_interactive(&mut self) {
        let Some(model) = self.model.as_mut() else {
            self.is_playing = false;
            return;
        };
        if model.state().step() as usize >= self.config.num_steps {
            self.is_playing = false;
            return;
        }
        match model.step() {
            Ok(snapshot) => {
                self.current_run_history.push(snapshot.price);
                self.current_holdings_history.push(snapshot.mean_holdings);
            }
            Err(err) => {
                self.error = Some(err.to_string());
                self.is_playing = false;
            }
        }
    }
}

impl eframe::App for VisualizerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // If a batch is running, process a small chunk on each UI frame.
        if self.is_batch_running {
            let runs_per_frame = 5;
            let end_run = (self.batch_runs_done + runs_per_frame).min(self.num_runs_to_batch);

            for run in self.batch_runs_done..end_run {
                match self.simulate_path(self.base_seed + run as u64) {
                    Ok(path) => self.run_price_histories.push(path),
                    Err(err) => {
                        self.error = Some(err.to_string());
                        self.is_batch_running = false;
                        break;
                    }
                }
            }

            self.batch_runs_done = end_run;
            if self.batch_runs_done >= self.num_runs_to_batch {
                self.is_batch_running = false;
            }
        }

        // This is the interactive, animated mode
        if self.is_playing && self.last_update.elapsed() > Duration::from_millis(50) {
            self.advance_interactive();
            self.last_update = Instant::now();
        }
        ctx.request_repaint();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Agentic Market Simulator");
                ui.add_space(20.0);

                if ui.button(if self.is_playing { "Pause" } else { "Play" }).clicked() {
                    self.is_playing = !self.is_playing;
                    self.last_update = Instant::now();
                }
                if ui.button("Start New Run").clicked() {
                    self.start_new_run();
                    self.is_playing = true;
                }
                if ui.button("Clear All Runs").clicked() {
                    self.clear_all_runs();
                }
            });

            // --- Controls for Batch Mode ---
            ui.horizontal(|ui| {
                ui.label("Batch size:");
                ui.add_enabled(
                    !self.is_batch_running,
                    egui::DragValue::new(&mut self.num_runs_to_batch)
                        .speed(1.0)
                        .clamp_range(1..=1000),
                );
                if ui
                    .add_enabled(!self.is_batch_running, egui::Button::new("Run Batch"))
                    .clicked()
                {
                    self.run_batch_simulations();
                }
            });

            if self.is_batch_running {
                let progress = self.batch_runs_done as f32 / self.num_runs_to_batch as f32;
                let progress_text = format!(
                    "Running Batch... {}/{}",
                    self.batch_runs_done, self.num_runs_to_batch
                );
                ui.add(ProgressBar::new(progress).text(progress_text));
            }

            ui.collapsing("Simulation Parameters (apply on next run)", |ui| {
                ui.add(egui::DragValue::new(&mut self.config.num_steps).suffix(" steps"));
                ui.add(egui::DragValue::new(&mut self.config.num_agents).prefix("Agents: "));
                ui.add(
                    egui::DragValue::new(&mut self.config.price.drift)
                        .speed(0.001)
                        .prefix("Drift: "),
                );
                ui.add(
                    egui::DragValue::new(&mut self.config.price.volatility)
                        .speed(0.001)
                        .prefix("Volatility: "),
                );
                ui.add(
                    egui::DragValue::new(&mut self.config.price.initial_price)
                        .prefix("Initial Price: $"),
                );
                ui.add(egui::DragValue::new(&mut self.base_seed).prefix("Base Seed: "));
            });

            if let Some(err) = &self.error {
                ui.colored_label(Color32::LIGHT_RED, err);
            }
            ui.separator();

            Frame::dark_canvas(ui.style())
                .inner_margin(egui::Margin::symmetric(12.0, 8.0))
                .show(ui, |ui| {
                    ui.heading("Current Run");
                    ui.separator();
                    let big_font = FontId::monospace(18.0);
                    let mono_font = FontId::monospace(14.0);
                    let price = self.current_run_history.last().copied().unwrap_or_default();
                    ui.horizontal(|ui| {
                        ui.vertical(|ui| {
                            ui.label("Price:");
                            ui.label(
                                RichText::new(format!("$ {price:.2}"))
                                    .font(big_font)
                                    .color(Color32::LIGHT_GREEN),
                            );
                        });
                        ui.add(egui::Separator::default().vertical());
                        if let Some(model) = &self.model {
                            egui::Grid::new("signal_grid")
                                .num_columns(2)
                                .spacing([20.0, 2.0])
                                .show(ui, |ui| {
                                    ui.label(RichText::new("Step:").strong());
                                    ui.label(
                                        RichText::new(model.state().step().to_string())
                                            .font(mono_font.clone()),
                                    );
                                    ui.end_row();
                                    if let Some(signal) = model.active_signal() {
                                        ui.label(RichText::new("Signal:").strong());
                                        ui.label(
                                            RichText::new(format!(
                                                "{} {:.2} ({})",
                                                signal.action(),
                                                signal.confidence(),
                                                signal.source()
                                            ))
                                            .font(mono_font.clone()),
                                        );
                                        ui.end_row();
                                    }
                                    if let Some(last) = model.record().last() {
                                        ui.label(RichText::new("Mean Holdings:").strong());
                                        ui.label(
                                            RichText::new(format!("{:.4}", last.mean_holdings))
                                                .font(mono_font.clone()),
                                        );
                                        ui.end_row();
                                        ui.label(RichText::new("Aggregate Cash:").strong());
                                        ui.label(
                                            RichText::new(format!("{:.2}", last.aggregate_cash))
                                                .font(mono_font.clone()),
                                        );
                                        ui.end_row();
                                    }
                                });
                        }
                    });
                });
            ui.add_space(4.0);

            let plot_height = (ui.available_height() - 8.0) * 0.65;
            Frame::dark_canvas(ui.style()).show(ui, |ui| {
                Plot::new("price_plot")
                    .height(plot_height)
                    .width(ui.available_width())
                    .legend(Legend::default())
                    .show(ui, |plot_ui| {
                        for history in self.run_price_histories.iter() {
                            let line = Line::new(PlotPoints::from_ys_f64(history))
                                .color(Color32::from_gray(100).additive())
                                .stroke(Stroke::new(1.0, Color32::from_gray(100).additive()));
                            plot_ui.line(line);
                        }
                        if !self.current_run_history.is_empty() {
                            let active_line =
                                Line::new(PlotPoints::from_ys_f64(&self.current_run_history))
                                    .color(Color32::LIGHT_BLUE)
                                    .stroke(Stroke::new(2.0, Color32::LIGHT_BLUE))
                                    .name("Current Run");
                            plot_ui.line(active_line);
                        }
                    });
            });
            ui.add_space(4.0);
            Frame::dark_canvas(ui.style()).show(ui, |ui| {
                Plot::new("holdings_plot")
                    .height(ui.available_height())
                    .width(ui.available_width())
                    .legend(Legend::default())
                    .show(ui, |plot_ui| {
                        let line =
                            Line::new(PlotPoints::from_ys_f64(&self.current_holdings_history))
                                .color(Color32::GOLD)
                                .name("Mean Holdings");
                        plot_ui.line(line);
                    });
            });
        });
    }
}

fn main() -> Result<(), eframe::Error> {
    init_tracing(Level::WARN);

    let mut config = SimConfig {
        num_steps: 252,
        ..SimConfig::default()
    };
    config.price.seed = Some(42);
    let app_state = VisualizerApp::new(config);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 750.0])
            .with_title("Agentic Market Visualizer"),
        ..Default::default()
    };

    eframe::run_native(
        "Agentic Market Visualizer App",
        native_options,
        Box::new(|_cc| Box::new(app_state)),
    )
}
