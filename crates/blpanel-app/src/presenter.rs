//! Presentation contract
//!
//! The narrow seam between the synchronizer core and whatever renders it.
//! The core calls these and never assumes a rendering technology; the
//! `blpanel` binary ships a console implementation.

use blpanel_core::DeviceRecord;

/// Render/notify callbacks invoked by the engine, exactly one per
/// processed queue item that changed something user-visible.
///
/// All calls arrive from the engine's single execution context, in queue
/// arrival order.
pub trait Presenter: Send {
    /// A new device became visible
    fn device_added(&mut self, record: &DeviceRecord);

    /// A visible device's resolved state changed (icon or status). Added
    /// devices render immediately with a placeholder icon; this fires
    /// once the async state query answers.
    fn device_updated(&mut self, record: &DeviceRecord);

    /// A fresh discovery cycle started; drop everything rendered
    fn device_list_cleared(&mut self);

    /// Show a dialog or notification (command status, error text,
    /// device information)
    fn dialog(&mut self, title: &str, body: &str);
}

/// Presenter that drops everything; used in tests and headless runs
#[derive(Debug, Default)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn device_added(&mut self, _record: &DeviceRecord) {}
    fn device_updated(&mut self, _record: &DeviceRecord) {}
    fn device_list_cleared(&mut self) {}
    fn dialog(&mut self, _title: &str, _body: &str) {}
}
