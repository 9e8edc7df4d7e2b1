//! # Chat Screen
//!
//! Renders the ordered conversation with auto-scroll, the in-progress
//! indicator, and the input row. Submission is disabled while the session is
//! rate-limited, the input is empty, or a send is already in flight.

use egui::{Align, Key, Layout, RichText, ScrollArea, TextEdit};
use shared::dto::chat::Sender;

use crate::app::ChatApp;
use crate::ui::theme::Theme;

pub fn render(ui: &mut egui::Ui, app: &ChatApp) {
    let theme = Theme::default();
    let snapshot = app.state.read().clone();

    // Header: remaining-request counter or the rate-limited badge
    ui.horizontal(|ui| {
        ui.heading("Tuition Assistant");
        ui.with_layout(Layout::right_to_left(egui::Align::Center), |ui| {
            if snapshot.blocked {
                ui.colored_label(theme.error, "● Rate limited");
            } else {
                ui.colored_label(
                    theme.success,
                    format!("● Online ({} requests left)", snapshot.remaining),
                );
            }
        });
    });
    ui.separator();

    if let Some(notice) = &snapshot.notice {
        ui.colored_label(theme.warning, notice);
        ui.separator();
    }

    let input_height = 64.0;
    ScrollArea::vertical()
        .stick_to_bottom(true)
        .auto_shrink([false, false])
        .max_height(ui.available_height() - input_height)
        .show(ui, |ui| {
            for entry in &snapshot.entries {
                let (align, bubble) = match entry.sender {
                    Sender::User => (Align::Max, theme.user_bubble),
                    Sender::Ai => (Align::Min, theme.ai_bubble),
                };
                ui.with_layout(Layout::top_down(align), |ui| {
                    ui.label(
                        RichText::new(&entry.text)
                            .color(theme.normal)
                            .background_color(bubble),
                    );
                    ui.label(RichText::new(&entry.time).small().color(theme.dim));
                });
                ui.add_space(6.0);
            }

            if snapshot.pending {
                // Animated dots while the assistant entry is on its way
                let time = ui.ctx().input(|i| i.time);
                let dots = match ((time * 2.0) as usize) % 4 {
                    0 => ".",
                    1 => "..",
                    2 => "...",
                    _ => "",
                };
                ui.label(RichText::new(format!("Assistant is thinking{dots}")).color(theme.dim));
                ui.ctx().request_repaint();
            }
        });

    ui.separator();

    let mut submitted = false;
    ui.horizontal(|ui| {
        let mut state = app.state.write();
        let interactive = !state.blocked && !state.pending;
        let hint = if state.blocked {
            "Rate limit reached. Start a new session to continue."
        } else {
            "Type your student ID or question..."
        };

        let send_width = 56.0;
        let edit = TextEdit::singleline(&mut state.input)
            .desired_width(ui.available_width() - send_width)
            .hint_text(hint);
        let response = ui.add_enabled(interactive, edit);

        let can_send = interactive && !state.input.trim().is_empty();
        let pressed_enter = response.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter));
        drop(state);

        let clicked = ui
            .add_enabled(can_send, egui::Button::new("Send"))
            .clicked();
        submitted = (pressed_enter && can_send) || clicked;

        if pressed_enter {
            response.request_focus();
        }
    });

    if submitted {
        app.submit();
    }
}
