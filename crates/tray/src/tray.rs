//! Tray presence: icon, menu, and tooltip refresh. Runs the OS event loop
//! on the main thread while the monitor ticks on the tokio runtime; the two
//! share only the cancellation token and the status watch channel.

use std::time::{Duration, Instant};

use tao::event::{Event, StartCause};
use tao::event_loop::{ControlFlow, EventLoopBuilder};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tray_icon::menu::{Menu, MenuEvent, MenuId, MenuItem};
use tray_icon::{Icon, TrayIcon, TrayIconBuilder};

use guardian_core::config::GuardianConfig;
use guardian_core::monitor::STARTUP_MESSAGE;

use crate::icon;
use crate::sink::DesktopSink;
use crate::sound;

/// How often the event loop wakes to drain menu events.
const MENU_POLL: Duration = Duration::from_millis(200);
/// Bounded wait for the monitor task when quitting.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

pub struct TrayApp {
    cfg: GuardianConfig,
    status_rx: watch::Receiver<String>,
    cancel: CancellationToken,
    runtime: tokio::runtime::Runtime,
    monitor_task: Option<JoinHandle<()>>,
}

struct MenuIds {
    show: MenuId,
    test_sound: MenuId,
    quit: MenuId,
}

impl TrayApp {
    pub fn new(
        cfg: GuardianConfig,
        status_rx: watch::Receiver<String>,
        cancel: CancellationToken,
        runtime: tokio::runtime::Runtime,
        monitor_task: JoinHandle<()>,
    ) -> Self {
        Self {
            cfg,
            status_rx,
            cancel,
            runtime,
            monitor_task: Some(monitor_task),
        }
    }

    /// Run the tray event loop. Never returns; the process exits with code
    /// 0 after a graceful quit.
    pub fn run(self) -> ! {
        let TrayApp {
            cfg,
            status_rx,
            cancel,
            runtime,
            mut monitor_task,
        } = self;

        let refresh = cfg.tooltip_refresh();
        let menu_channel = MenuEvent::receiver();

        let event_loop = EventLoopBuilder::new().build();
        // Created on Init: the tray icon must be built after the event loop
        // is live on some platforms.
        let mut tray: Option<TrayIcon> = None;
        let mut menu_ids: Option<MenuIds> = None;
        let mut next_refresh = Instant::now() + refresh;

        event_loop.run(move |event, _, control_flow| {
            *control_flow = ControlFlow::WaitUntil(Instant::now() + MENU_POLL);

            if let Event::NewEvents(StartCause::Init) = event {
                match build_tray() {
                    Ok((built, ids)) => {
                        tray = Some(built);
                        menu_ids = Some(ids);
                        next_refresh = Instant::now() + refresh;
                        tracing::info!("tray icon ready");
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "failed to create tray icon");
                        stop_monitor(&cancel, &runtime, &mut monitor_task);
                        *control_flow = ControlFlow::Exit;
                        return;
                    }
                }
            }

            while let Ok(menu_event) = menu_channel.try_recv() {
                let Some(ids) = menu_ids.as_ref() else {
                    continue;
                };
                if *menu_event.id() == ids.show {
                    let status = status_rx.borrow().clone();
                    DesktopSink::announce("Battery Guardian", &status);
                } else if *menu_event.id() == ids.test_sound {
                    tracing::info!("testing sound");
                    if let Err(e) = sound::play(true) {
                        tracing::warn!(error = %e, "test sound failed");
                    }
                } else if *menu_event.id() == ids.quit {
                    tracing::info!("quit requested from tray menu");
                    stop_monitor(&cancel, &runtime, &mut monitor_task);
                    tray = None;
                    *control_flow = ControlFlow::Exit;
                    return;
                }
            }

            if Instant::now() >= next_refresh {
                next_refresh = Instant::now() + refresh;
                if let Some(tray) = tray.as_ref() {
                    let message = status_rx.borrow().clone();
                    if let Err(e) = tray.set_tooltip(Some(&message)) {
                        tracing::debug!(error = %e, "tooltip update failed");
                    }
                }
            }

            // An OS signal cancels the shared token; fold the tray down too.
            if cancel.is_cancelled() {
                stop_monitor(&cancel, &runtime, &mut monitor_task);
                tray = None;
                *control_flow = ControlFlow::Exit;
            }
        })
    }
}

fn build_tray() -> anyhow::Result<(TrayIcon, MenuIds)> {
    let menu = Menu::new();
    let show = MenuItem::new("Show", true, None);
    let test_sound = MenuItem::new("Test Sound", true, None);
    let quit = MenuItem::new("Quit", true, None);
    menu.append_items(&[&show, &test_sound, &quit])?;

    let icon = Icon::from_rgba(icon::battery_glyph(), icon::ICON_SIZE, icon::ICON_SIZE)?;
    let tray = TrayIconBuilder::new()
        .with_menu(Box::new(menu))
        .with_tooltip(STARTUP_MESSAGE)
        .with_icon(icon)
        .build()?;

    let ids = MenuIds {
        show: show.id().clone(),
        test_sound: test_sound.id().clone(),
        quit: quit.id().clone(),
    };
    Ok((tray, ids))
}

/// Cancel the shared token and give the monitor a bounded window to finish
/// its tick before the process goes down.
fn stop_monitor(
    cancel: &CancellationToken,
    runtime: &tokio::runtime::Runtime,
    task: &mut Option<JoinHandle<()>>,
) {
    cancel.cancel();
    if let Some(task) = task.take() {
        let joined = runtime.block_on(async { tokio::time::timeout(SHUTDOWN_TIMEOUT, task).await });
        match joined {
            Ok(Ok(())) => tracing::info!("monitor stopped"),
            Ok(Err(e)) => tracing::warn!(error = %e, "monitor task panicked"),
            Err(_) => tracing::warn!("monitor did not stop within the shutdown timeout"),
        }
    }
}
