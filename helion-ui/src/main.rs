use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use eframe::{egui, Frame};
use egui::{Color32, Context};

use helion_core::{
    ClientConfig, Error, InferenceClient, ModelId, PredictionRequest, RestClient, Session, SessionStatus,
    TransportError,
};

/// Request id and result of a prediction, sent back by the worker thread.
type Completion = (u64, Result<String, TransportError>);

/// Global UI state (MUST persist between frames in egui).
struct PredictorUI {
    rest: RestClient,
    session: Session,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
}

impl PredictorUI {
    /// Initializes the UI with an empty session.
    fn new() -> Result<Self, Error> {
        let config = ClientConfig::from_env()?;
        log::info!("inference API at {}", config.base_url());
        let (tx, rx) = mpsc::channel();
        Ok(Self {
            rest: RestClient::new(config)?,
            session: Session::new(),
            tx,
            rx,
        })
    }

    /// Validates the form and sends the request from a worker thread.
    ///
    /// Validation errors land in the session status; nothing is sent.
    fn predict_next(&mut self, ctx: &Context) {
        let request: PredictionRequest = match self.session.begin_prediction() {
            Ok(request) => request,
            Err(e) => {
                log::debug!("prediction not sent: {e}");
                return;
            }
        };

        let rest = self.rest.clone();
        let tx = self.tx.clone();
        let ctx = ctx.clone();
        thread::spawn(move || {
            let result = rest.predict(&request);
            if tx.send((request.id, result)).is_err() {
                log::warn!("UI closed before the prediction completed");
            }
            ctx.request_repaint();
        });
    }

    /// Applies completions received since the last frame.
    fn poll_completions(&mut self) {
        while let Ok((id, result)) = self.rx.try_recv() {
            self.session.complete_prediction(id, result);
        }
    }

    fn is_waiting(&self) -> bool {
        *self.session.status() == SessionStatus::AwaitingResponse
    }

    fn model_picker(&mut self, ui: &mut egui::Ui) {
        let current = self.session.selection().map(|s| s.model());
        let mut choice = current;

        ui.label("Model");
        ui.add_enabled_ui(!self.is_waiting(), |ui| {
            egui::ComboBox::from_id_salt("model")
                .selected_text(current.map_or("Select an Option", |m| m.label()))
                .width(280.0)
                .show_ui(ui, |ui| {
                    for model in ModelId::ALL {
                        ui.selectable_value(&mut choice, Some(model), model.label());
                    }
                });
        });
        ui.end_row();

        if choice != current {
            if let Some(model) = choice {
                if let Err(e) = self.session.select_model(model) {
                    log::warn!("{e}");
                }
            }
        }
    }

    fn length_picker(&mut self, ui: &mut egui::Ui) {
        let Some(selection) = self.session.selection() else {
            return;
        };
        let current = self.session.window().len();
        let mut choice = current;

        ui.label("Input Sequence Length");
        let editable = !self.session.is_length_locked() && !self.is_waiting();
        ui.add_enabled_ui(editable, |ui| {
            egui::ComboBox::from_id_salt("sequence_length")
                .selected_text(if current == 0 { "Select".to_owned() } else { current.to_string() })
                .show_ui(ui, |ui| {
                    for length in selection.model().length_policy().choices() {
                        ui.selectable_value(&mut choice, length, length.to_string());
                    }
                });
        });
        ui.end_row();

        if choice != current {
            if let Err(e) = self.session.set_sequence_length(choice) {
                log::warn!("{e}");
            }
        }
    }

    fn token_fields(&mut self, ui: &mut egui::Ui) {
        let editable = !self.is_waiting();
        for index in 0..self.session.window().len() {
            let mut value = self.session.window().get(index).unwrap_or_default().to_owned();
            ui.label(format!("Input Sequence {}", index + 1));
            let response = ui.add_enabled(editable, egui::TextEdit::singleline(&mut value));
            if response.changed() {
                if let Err(e) = self.session.set_token(index, value) {
                    log::warn!("{e}");
                }
            }
            ui.end_row();
        }
    }

    fn history_cards(&self, ui: &mut egui::Ui) {
        if self.session.history().is_empty() {
            ui.label("Predictions will appear here");
            return;
        }

        egui::ScrollArea::vertical()
            .stick_to_bottom(true)
            .show(ui, |ui| {
                for entry in self.session.history().entries() {
                    egui::Frame::group(ui.style()).show(ui, |ui| {
                        ui.set_width(ui.available_width());
                        if entry.is_prediction() {
                            ui.strong(entry.title());
                            ui.label(entry.description());
                        } else {
                            ui.colored_label(Color32::RED, entry.title());
                            ui.label(entry.description());
                        }
                    });
                    ui.add_space(6.0);
                }
            });
    }
}

impl eframe::App for PredictorUI {
    /// UI update loop (called every frame).
    fn update(&mut self, ctx: &Context, _: &mut Frame) {
        self.poll_completions();

        egui::SidePanel::left("form").min_width(420.0).show(ctx, |ui| {
            ui.heading("Start Predicting Events");
            ui.separator();

            egui::Grid::new("prediction_form")
                .num_columns(2)
                .spacing([20.0, 6.0])
                .striped(true)
                .show(ui, |ui| {
                    self.model_picker(ui);
                    self.length_picker(ui);
                    self.token_fields(ui);
                });

            ui.separator();

            let waiting = self.is_waiting();
            ui.horizontal(|ui| {
                let predict = egui::Button::new(self.session.button_label());
                if ui.add_enabled(!waiting, predict).clicked() {
                    self.predict_next(ctx);
                }
                if ui.button("Reset").clicked() {
                    self.session.reset();
                }
                if waiting {
                    ui.spinner();
                }
            });

            if let Some(message) = self.session.status().error_message() {
                ui.colored_label(Color32::RED, message);
            }
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.history_cards(ui);
        });
    }
}

/// Application entry point.
fn main() -> eframe::Result {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 600.0])
            .with_resizable(true),
        ..Default::default()
    };

    eframe::run_native(
        "helion",
        options,
        Box::new(|_| Ok(Box::new(PredictorUI::new()?))),
    )
}
