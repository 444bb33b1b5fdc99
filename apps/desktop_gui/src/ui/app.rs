use client_core::{ConnectionController, WsConnector};
use crossbeam_channel::{unbounded, Receiver};
use eframe::egui;
use shared::protocol::{LogKind, TransportEvent};
use tokio::runtime::Runtime;
use url::Url;

use crate::backend_bridge::runtime::ui_event_sink;
use crate::ui::surface::{GuiSurface, IndicatorStyle};

const SEND_BUTTON_WIDTH: f32 = 72.0;

pub struct ChatApp {
    controller: ConnectionController<WsConnector, GuiSurface>,
    ui_rx: Receiver<TransportEvent>,
    // Owns the transport workers; dropped with the window.
    _runtime: Runtime,
}

impl ChatApp {
    pub fn new(ctx: egui::Context, endpoint: Url, auto_connect: bool, runtime: Runtime) -> Self {
        let (ui_tx, ui_rx) = unbounded();
        let sink = ui_event_sink(ui_tx, move || ctx.request_repaint());
        let connector = WsConnector::new(runtime.handle().clone(), sink);

        let mut controller = ConnectionController::new(endpoint, connector, GuiSurface::default());
        controller.start(auto_connect);

        Self {
            controller,
            ui_rx,
            _runtime: runtime,
        }
    }

    fn process_transport_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            self.controller.handle_event(event);
        }
    }

    fn show_status_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let status = self.controller.surface().indicator;
                let style = IndicatorStyle::for_status(status);
                egui::Frame::new()
                    .fill(style.background)
                    .corner_radius(6.0)
                    .inner_margin(egui::Margin::symmetric(8, 4))
                    .show(ui, |ui| {
                        ui.label(egui::RichText::new(status.label()).color(style.text).strong());
                    });
                ui.label(egui::RichText::new(self.controller.endpoint().as_str()).weak());

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let label = self.controller.surface().toggle_label.clone();
                    if ui.button(label).clicked() {
                        self.controller.toggle();
                    }
                });
            });
        });
    }

    fn show_composer(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("composer").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                let wants_focus = self.controller.surface_mut().take_focus_request();
                let width = (ui.available_width() - SEND_BUTTON_WIDTH).max(0.0);
                let edit = egui::TextEdit::singleline(&mut self.controller.surface_mut().input)
                    .id_salt("chat_input")
                    .hint_text("Type a message")
                    .desired_width(width);
                let response = ui.add(edit);
                if wants_focus {
                    response.request_focus();
                }

                let enter_pressed =
                    response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                let send_clicked = ui.button("Send").clicked();
                if enter_pressed || send_clicked {
                    self.controller.submit();
                }
            });
            ui.add_space(4.0);
        });
    }

    fn show_log(&self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .id_salt("chat_log_scroll")
                .auto_shrink([false, false])
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    for line in &self.controller.surface().log {
                        let text = match line.kind {
                            LogKind::Status => {
                                egui::RichText::new(line.display_text()).italics().weak()
                            }
                            LogKind::Message => egui::RichText::new(line.display_text()),
                        };
                        ui.horizontal_wrapped(|ui| {
                            ui.label(
                                egui::RichText::new(line.at.format("%H:%M:%S").to_string())
                                    .small()
                                    .weak(),
                            );
                            ui.label(text);
                        });
                    }
                });
        });
    }
}

impl eframe::App for ChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_transport_events();

        self.show_status_bar(ctx);
        self.show_composer(ctx);
        self.show_log(ctx);
    }
}
