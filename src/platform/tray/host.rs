//! Tray icon event loop, built on `tray-icon`.
//!
//! The first `show` starts the toolkit thread (see `dispatch`): a GTK main
//! loop on Linux, a `GetMessageW` loop on Windows. The toolkit is initialised
//! once per process on that thread and the loop runs until exit. `show` and
//! `hide` post jobs to it; the icon lives in a thread-local there, the only
//! thread allowed to touch it. Showing again replaces the previous icon.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::mpsc::Receiver;
use std::sync::OnceLock;
use std::time::Duration;

use tray_icon::menu::{Menu, MenuEvent, MenuId, MenuItem as TrayMenuItem};
use tray_icon::{Icon, TrayIcon, TrayIconBuilder};

use super::dispatch::{Dispatcher, Job, Wake};
use super::{MenuAction, MenuItem};
use crate::platform::resources::IconImage;
use crate::platform::PlatformError;

const REPLY_TIMEOUT: Duration = Duration::from_secs(5);

static TOOLKIT: OnceLock<Result<Dispatcher, String>> = OnceLock::new();

thread_local! {
    static ICON: RefCell<Option<TrayIcon>> = const { RefCell::new(None) };
}

fn toolkit() -> Result<&'static Dispatcher, PlatformError> {
    TOOLKIT
        .get_or_init(|| Dispatcher::start("tray", init_toolkit, run_loop).map_err(|e| e.to_string()))
        .as_ref()
        .map_err(|e| PlatformError::Unavailable(e.clone()))
}

/// Creates the icon, replacing any icon already shown.
pub(crate) fn show(tooltip: String, icon: IconImage, items: Vec<MenuItem>) -> Result<(), PlatformError> {
    toolkit()?.call(REPLY_TIMEOUT, move || {
        let tray = build(&tooltip, icon, items)?;
        ICON.with(|slot| slot.replace(Some(tray)));
        Ok(())
    })?
}

/// Removes the icon. The loop keeps running for the next `show`.
pub(crate) fn hide() -> Result<(), PlatformError> {
    let Some(Ok(toolkit)) = TOOLKIT.get() else {
        return Ok(());
    };
    toolkit.call(REPLY_TIMEOUT, || {
        MenuEvent::set_event_handler(None::<fn(MenuEvent)>);
        ICON.with(|slot| slot.borrow_mut().take());
    })
}

fn build(tooltip: &str, icon: IconImage, items: Vec<MenuItem>) -> Result<TrayIcon, PlatformError> {
    let menu = Menu::new();
    let mut actions: HashMap<MenuId, MenuAction> = HashMap::new();
    for item in items {
        let entry = TrayMenuItem::new(&item.label, item.enabled, None);
        menu.append(&entry)
            .map_err(|e| PlatformError::Other(format!("tray menu: {e}")))?;
        actions.insert(entry.id().clone(), item.action);
    }

    MenuEvent::set_event_handler(Some(move |event: MenuEvent| {
        if let Some(action) = actions.get(&event.id) {
            action();
        }
    }));

    let icon = Icon::from_rgba(icon.rgba, icon.width, icon.height)
        .map_err(|e| PlatformError::Other(format!("tray icon: {e}")))?;

    TrayIconBuilder::new()
        .with_menu(Box::new(menu))
        .with_tooltip(tooltip)
        .with_icon(icon)
        .build()
        .map_err(|e| PlatformError::Other(format!("tray: {e}")))
}

// ---------------------------------------------------------------------------
// Linux: GTK main loop
// ---------------------------------------------------------------------------

#[cfg(target_os = "linux")]
thread_local! {
    static QUEUE: RefCell<Option<Receiver<Job>>> = const { RefCell::new(None) };
}

#[cfg(target_os = "linux")]
fn init_toolkit() -> Result<Wake, PlatformError> {
    gtk::init().map_err(|e| PlatformError::Unavailable(format!("gtk: {e}")))?;
    Ok(Box::new(|| {
        gtk::glib::MainContext::default().invoke(|| {
            QUEUE.with(|queue| {
                if let Some(queue) = queue.borrow().as_ref() {
                    super::dispatch::drain(queue);
                }
            })
        })
    }))
}

#[cfg(target_os = "linux")]
fn run_loop(queue: Receiver<Job>) {
    QUEUE.with(|slot| *slot.borrow_mut() = Some(queue));
    gtk::main();
}

// ---------------------------------------------------------------------------
// Windows: message loop
// ---------------------------------------------------------------------------

#[cfg(target_os = "windows")]
const WAKE_MESSAGE: u32 = windows_sys::Win32::UI::WindowsAndMessaging::WM_APP;

#[cfg(target_os = "windows")]
fn init_toolkit() -> Result<Wake, PlatformError> {
    use std::ptr;
    use windows_sys::Win32::System::Threading::GetCurrentThreadId;
    use windows_sys::Win32::UI::WindowsAndMessaging::{
        PeekMessageW, PostThreadMessageW, MSG, PM_NOREMOVE,
    };

    // Creates the thread's message queue; posts to a thread without one are lost.
    let thread_id = unsafe {
        let mut msg: MSG = std::mem::zeroed();
        PeekMessageW(&mut msg, ptr::null_mut(), 0, 0, PM_NOREMOVE);
        GetCurrentThreadId()
    };
    Ok(Box::new(move || unsafe {
        PostThreadMessageW(thread_id, WAKE_MESSAGE, 0, 0);
    }))
}

#[cfg(target_os = "windows")]
fn run_loop(queue: Receiver<Job>) {
    use std::ptr;
    use windows_sys::Win32::UI::WindowsAndMessaging::{
        DispatchMessageW, GetMessageW, TranslateMessage, MSG,
    };

    // Returns 0 on WM_QUIT, -1 on error; both exit the loop.
    unsafe {
        let mut msg: MSG = std::mem::zeroed();
        while GetMessageW(&mut msg, ptr::null_mut(), 0, 0) > 0 {
            if msg.hwnd.is_null() && msg.message == WAKE_MESSAGE {
                super::dispatch::drain(&queue);
                continue;
            }
            TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
    }
}

// ---------------------------------------------------------------------------
// Elsewhere
// ---------------------------------------------------------------------------

#[cfg(not(any(target_os = "linux", target_os = "windows")))]
fn init_toolkit() -> Result<Wake, PlatformError> {
    Err(PlatformError::Unavailable(
        "tray icons need the main thread on this platform".into(),
    ))
}

#[cfg(not(any(target_os = "linux", target_os = "windows")))]
fn run_loop(_queue: Receiver<Job>) {}
