//! Engine logs into the debug console, and the console onto the screen.

use std::fmt;

use bevy::log::BoxedLayer;
use bevy::log::tracing::field::{Field, Visit};
use bevy::log::tracing::{Event, Level, Subscriber};
use bevy::log::tracing_subscriber::Layer;
use bevy::log::tracing_subscriber::layer::Context;
use bevy::prelude::*;
use bevy_egui::{EguiContexts, EguiPrimaryContextPass, egui};
use penguin_meadow::{DebugConsole, LogLevel, PageLog};

#[derive(Resource, Clone)]
pub struct ConsoleHandle {
    pub console: DebugConsole,
    pub page: PageLog,
}

pub struct DebugConsolePlugin {
    pub visible: bool,
}

impl Plugin for DebugConsolePlugin {
    fn build(&self, app: &mut App) {
        if self.visible {
            app.add_systems(EguiPrimaryContextPass, draw_debug_console);
        }
    }
}

/// `LogPlugin::custom_layer` hook; needs [`ConsoleHandle`] inserted first.
pub fn console_layer(app: &mut App) -> Option<BoxedLayer> {
    let handle = app.world().get_resource::<ConsoleHandle>()?;
    Some(Box::new(ConsoleLayer {
        console: handle.console.clone(),
    }))
}

struct ConsoleLayer {
    console: DebugConsole,
}

impl<S: Subscriber> Layer<S> for ConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        self.console
            .record(console_level(*event.metadata().level()), visitor.finish());
    }
}

fn console_level(level: Level) -> LogLevel {
    match level {
        Level::ERROR => LogLevel::Error,
        Level::WARN => LogLevel::Warn,
        Level::INFO => LogLevel::Info,
        _ => LogLevel::Log,
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: Vec<String>,
}

impl MessageVisitor {
    fn finish(self) -> String {
        if self.fields.is_empty() {
            self.message
        } else {
            format!("{} {}", self.message, self.fields.join(" "))
        }
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.push(format!("{}={value}", field.name()));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        match field.name() {
            "message" => self.message = format!("{value:?}"),
            // Bridged `log` records carry their origin as extra fields.
            name if name.starts_with("log.") => {}
            name => self.fields.push(format!("{name}={value:?}")),
        }
    }
}

fn level_color(level: LogLevel) -> egui::Color32 {
    match level {
        LogLevel::Log => egui::Color32::from_gray(220),
        LogLevel::Info => egui::Color32::from_rgb(0x7f, 0xd4, 0xff),
        LogLevel::Warn => egui::Color32::from_rgb(0xff, 0xd7, 0x00),
        LogLevel::Error => egui::Color32::from_rgb(0xff, 0x63, 0x47),
    }
}

fn draw_debug_console(mut contexts: EguiContexts, handle: Res<ConsoleHandle>) {
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };
    let page = &handle.page;

    egui::TopBottomPanel::bottom("debug_console")
        .resizable(false)
        .show(ctx, |ui| {
            let header = ui.add(
                egui::Label::new(egui::RichText::new(page.header()).strong().monospace())
                    .sense(egui::Sense::click()),
            );
            if header.clicked() {
                page.toggle();
            }
            if page.is_collapsed() {
                return;
            }

            let jump = page.take_scroll_request();
            egui::ScrollArea::vertical()
                .max_height(160.0)
                .auto_shrink([false, true])
                .show(ui, |ui| {
                    for entry in page.entries() {
                        ui.label(
                            egui::RichText::new(entry.line())
                                .monospace()
                                .small()
                                .color(level_color(entry.level)),
                        );
                    }
                    if jump {
                        ui.scroll_to_cursor(Some(egui::Align::BOTTOM));
                    }
                });
        });
}
