//! Event-to-action dispatch for the interactive session.
//!
//! [`App`] composes the state machine, the profile picker and the slider,
//! and maps each [`UiEvent`] to the [`Action`]s the runtime must carry out.
//! It never spawns threads or prints, so every gesture can be replayed in a
//! test against a fake utility.

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::APPLY_FAILED_MESSAGE;
use crate::cooling::{AppPhase, AppStateMachine, DeviceCommand, ProfilePicker, SpeedSlider};
use crate::device::FanControl;
use crate::protocol::{FanMode, fallback_profiles};
use crate::ui::input::UiEvent;
use crate::ui::view::{self, MissingView, Screen, View};

/// Side effects requested by [`App::handle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Hand a best-effort command to the command worker.
    Send(DeviceCommand),
    /// Poll now instead of waiting for the next tick.
    RefreshNow,
    /// Start the poll loop and the command worker (entering `Active`).
    StartPolling,
    /// Redraw the current view.
    Render,
    Quit,
}

/// Session tunables.
#[derive(Debug, Clone)]
pub struct AppOptions {
    pub binary: String,
    pub fallback_profiles: Vec<String>,
    pub slider_step: u8,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            binary: crate::protocol::DEFAULT_BINARY.to_string(),
            fallback_profiles: fallback_profiles(),
            slider_step: 5,
        }
    }
}

/// Interactive session state.
pub struct App<C: ?Sized> {
    client: Arc<C>,
    options: AppOptions,
    machine: AppStateMachine,
    /// Present only while awaiting a profile.
    picker: Option<ProfilePicker>,
    slider: SpeedSlider,
    /// Mode the user asked for, shown until the next snapshot arrives.
    mode_override: Option<FanMode>,
    notice: Option<String>,
    show_help: bool,
}

impl<C: FanControl + ?Sized> App<C> {
    /// Run the bootstrap check and, when a profile is needed, fetch the
    /// recommendations once for this setup session.
    pub fn bootstrap(client: Arc<C>, options: AppOptions) -> Self {
        let machine = AppStateMachine::bootstrap(&*client);
        let picker = (machine.current_phase() == AppPhase::AwaitingConfig)
            .then(|| ProfilePicker::load(&*client, &options.fallback_profiles));

        Self {
            client,
            options,
            machine,
            picker,
            slider: SpeedSlider::new(),
            mode_override: None,
            notice: None,
            show_help: false,
        }
    }

    pub fn phase(&self) -> AppPhase {
        self.machine.current_phase()
    }

    pub fn screen(&self) -> Screen {
        Screen::from(self.phase())
    }

    /// Number of profiles on the setup screen, 0 elsewhere.
    pub fn profile_count(&self) -> usize {
        self.picker.as_ref().map_or(0, |p| p.profiles().len())
    }

    pub fn slider(&self) -> &SpeedSlider {
        &self.slider
    }

    pub fn show_help(&self) -> bool {
        self.show_help
    }

    /// Actions to run once, right after bootstrap.
    pub fn startup_actions(&self) -> Vec<Action> {
        match self.phase() {
            AppPhase::Active => vec![Action::StartPolling, Action::Render],
            _ => vec![Action::Render],
        }
    }

    /// Current view.
    pub fn view(&self) -> View {
        let notice = self.notice.as_deref();
        match self.phase() {
            AppPhase::Uninstalled => View::Missing(MissingView {
                binary: self.options.binary.clone(),
            }),
            AppPhase::AwaitingConfig => {
                let empty = ProfilePicker::new(Vec::new(), true);
                View::Setup(view::render_setup(
                    self.picker.as_ref().unwrap_or(&empty),
                    notice,
                ))
            }
            AppPhase::Active => View::Main(view::render_main(
                self.machine.latest(),
                &self.slider,
                self.mode_override,
                notice,
            )),
        }
    }

    /// Report a problem with the user's input.
    pub fn reject_input(&mut self, message: String) -> Vec<Action> {
        self.notice = Some(message);
        vec![Action::Render]
    }

    /// Dispatch one event.
    pub fn handle(&mut self, event: UiEvent) -> Vec<Action> {
        match event {
            UiEvent::Quit => return vec![Action::Quit],
            UiEvent::Help => {
                self.show_help = !self.show_help;
                return vec![Action::Render];
            }
            UiEvent::Snapshot(snapshot) => {
                if self.machine.observe(snapshot) {
                    self.mode_override = None;
                    return vec![Action::Render];
                }
                return Vec::new();
            }
            _ => {}
        }

        let actions = match self.screen() {
            Screen::Missing => None,
            Screen::Setup => self.handle_setup(&event),
            Screen::Main => self.handle_main(&event),
        };

        match actions {
            Some(actions) => actions,
            None => {
                debug!("Ignoring {:?} on {:?} screen", event, self.screen());
                Vec::new()
            }
        }
    }

    fn handle_setup(&mut self, event: &UiEvent) -> Option<Vec<Action>> {
        let picker = self.picker.as_mut()?;

        match event {
            UiEvent::SelectProfile(index) => {
                picker.select(*index);
            }
            UiEvent::NextProfile => picker.select_next(),
            UiEvent::PrevProfile => picker.select_prev(),
            UiEvent::ApplyProfile => return Some(self.apply_selected()),
            _ => return None,
        }

        self.notice = None;
        Some(vec![Action::Render])
    }

    fn apply_selected(&mut self) -> Vec<Action> {
        let Some(name) = self
            .picker
            .as_ref()
            .and_then(|p| p.selected())
            .map(String::from)
        else {
            return Vec::new();
        };

        match self.machine.apply_profile(&*self.client, &name) {
            Ok(()) => {
                info!("Setup finished with profile '{}'", name);
                self.picker = None;
                self.notice = None;
                vec![Action::StartPolling, Action::Render]
            }
            Err(e) => {
                info!("Setup apply failed: {}", e);
                self.notice = Some(APPLY_FAILED_MESSAGE.to_string());
                vec![Action::Render]
            }
        }
    }

    fn handle_main(&mut self, event: &UiEvent) -> Option<Vec<Action>> {
        let actions = match event {
            UiEvent::SliderDrag(value) => {
                self.slider.drag(*value);
                self.mode_override = Some(FanMode::Manual);
                vec![Action::Render]
            }
            UiEvent::SliderNudge(steps) => {
                self.slider
                    .nudge(steps * i32::from(self.options.slider_step));
                self.mode_override = Some(FanMode::Manual);
                vec![Action::Render]
            }
            UiEvent::SliderCommit => self.commit_slider(),
            UiEvent::SliderCancel => {
                self.slider.cancel();
                vec![Action::Render]
            }
            UiEvent::SetSpeed(value) => {
                self.slider.drag(*value);
                self.commit_slider()
            }
            UiEvent::EnableAuto => {
                if self.effective_mode() == FanMode::Auto {
                    // Toggle is disabled while the fan is already automatic.
                    return Some(Vec::new());
                }
                self.mode_override = Some(FanMode::Auto);
                vec![Action::Send(DeviceCommand::SetAuto), Action::Render]
            }
            UiEvent::Refresh => vec![Action::RefreshNow],
            _ => return None,
        };

        self.notice = None;
        Some(actions)
    }

    fn commit_slider(&mut self) -> Vec<Action> {
        let Some(percent) = self.slider.commit() else {
            // Nothing was dragged; a bare Enter only redraws.
            return vec![Action::Render];
        };
        self.mode_override = Some(FanMode::Manual);
        vec![
            Action::Send(DeviceCommand::SetSpeed(percent)),
            Action::Render,
        ]
    }

    fn effective_mode(&self) -> FanMode {
        self.mode_override
            .or_else(|| self.machine.latest().map(|s| s.mode()))
            .unwrap_or(FanMode::Manual)
    }
}
