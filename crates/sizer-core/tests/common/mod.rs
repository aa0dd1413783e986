#![allow(dead_code)]

use std::cell::RefCell;
use std::io::Cursor;
use std::path::PathBuf;
use std::rc::Rc;

use image::{ImageFormat, RgbImage};
use sizer_core::config::ClientConfig;
use sizer_core::crop::{CropGeometry, CropOptions, CropWidget, CropWidgetFactory};
use sizer_core::error::{Result, SizerError};
use sizer_core::ratio::AspectRatio;
use sizer_core::selection::{ImageSource, PendingFile};
use sizer_core::upload::{DownloadSink, Transport, TransportResponse, UploadRequest};
use sizer_core::workbench::Workbench;

/// Shared record of everything the mock widgets saw.
#[derive(Debug, Default)]
pub struct WidgetLog {
    pub constructed: usize,
    pub destroyed: usize,
    pub ratios: Vec<AspectRatio>,
    pub options: Vec<CropOptions>,
    pub sources: Vec<String>,
    /// Geometry every widget reports from `data()`.
    pub geometry: CropGeometry,
}

impl WidgetLog {
    pub fn live(&self) -> usize {
        self.constructed - self.destroyed
    }
}

pub struct MockWidget {
    log: Rc<RefCell<WidgetLog>>,
    destroyed: bool,
}

impl CropWidget for MockWidget {
    fn set_aspect_ratio(&mut self, ratio: AspectRatio) {
        self.log.borrow_mut().ratios.push(ratio);
    }

    fn data(&self) -> CropGeometry {
        self.log.borrow().geometry
    }

    fn destroy(&mut self) {
        if !self.destroyed {
            self.destroyed = true;
            self.log.borrow_mut().destroyed += 1;
        }
    }
}

#[derive(Clone, Default)]
pub struct MockFactory {
    pub log: Rc<RefCell<WidgetLog>>,
    pub fail: bool,
}

impl MockFactory {
    pub fn with_geometry(geometry: CropGeometry) -> Self {
        let factory = Self::default();
        factory.log.borrow_mut().geometry = geometry;
        factory
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }
}

impl CropWidgetFactory for MockFactory {
    type Widget = MockWidget;

    fn construct(&mut self, source: &ImageSource, options: &CropOptions) -> Result<MockWidget> {
        if self.fail {
            return Err(SizerError::InvalidDimensions {
                width: 0,
                height: 0,
            });
        }
        let mut log = self.log.borrow_mut();
        log.constructed += 1;
        log.options.push(*options);
        log.sources.push(source.name.clone());
        Ok(MockWidget {
            log: Rc::clone(&self.log),
            destroyed: false,
        })
    }
}

/// Records requests and answers each with the same scripted outcome.
#[derive(Clone)]
pub struct MockTransport {
    pub requests: Rc<RefCell<Vec<UploadRequest>>>,
    outcome: std::result::Result<TransportResponse, String>,
}

impl MockTransport {
    pub fn responding(response: TransportResponse) -> Self {
        Self {
            requests: Rc::default(),
            outcome: Ok(response),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            requests: Rc::default(),
            outcome: Err(message.to_owned()),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.borrow().len()
    }

    pub fn last_request(&self) -> Option<UploadRequest> {
        self.requests.borrow().last().cloned()
    }
}

impl Transport for MockTransport {
    async fn post(&self, request: UploadRequest) -> Result<TransportResponse> {
        self.requests.borrow_mut().push(request);
        self.outcome.clone().map_err(SizerError::Transport)
    }
}

/// Never answers.
#[derive(Clone, Default)]
pub struct HangingTransport {
    pub calls: Rc<RefCell<usize>>,
}

impl Transport for HangingTransport {
    async fn post(&self, _request: UploadRequest) -> Result<TransportResponse> {
        *self.calls.borrow_mut() += 1;
        std::future::pending::<Result<TransportResponse>>().await
    }
}

#[derive(Clone, Default)]
pub struct MemorySink {
    pub saved: Rc<RefCell<Vec<(String, Vec<u8>)>>>,
}

impl DownloadSink for MemorySink {
    fn save(&mut self, filename: &str, bytes: Vec<u8>) -> Result<PathBuf> {
        self.saved.borrow_mut().push((filename.to_owned(), bytes));
        Ok(PathBuf::from(filename))
    }
}

pub struct FailingSink;

impl DownloadSink for FailingSink {
    fn save(&mut self, _filename: &str, _bytes: Vec<u8>) -> Result<PathBuf> {
        Err(SizerError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only",
        )))
    }
}

/// Encode a blank PNG of the given size.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::new(width, height);
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

pub fn pending_file(name: &str) -> PendingFile {
    PendingFile::new(name, "image/png", png_bytes(64, 36))
}

pub fn ok_response(content_disposition: Option<&str>, body: &[u8]) -> TransportResponse {
    TransportResponse {
        status: 200,
        content_disposition: content_disposition.map(str::to_owned),
        body: body.to_vec(),
    }
}

pub fn error_response(status: u16, body: &[u8]) -> TransportResponse {
    TransportResponse {
        status,
        content_disposition: None,
        body: body.to_vec(),
    }
}

pub type MockWorkbench<T = MockTransport> = Workbench<MockFactory, T, MemorySink>;

pub fn workbench<T: Transport>(factory: MockFactory, transport: T, sink: MemorySink) -> MockWorkbench<T> {
    Workbench::new(factory, transport, sink, &ClientConfig::default())
}

/// Workbench with a file selected and the crop surface open.
pub fn opened_workbench<T: Transport>(
    factory: MockFactory,
    transport: T,
    sink: MemorySink,
) -> MockWorkbench<T> {
    let mut wb = workbench(factory, transport, sink);
    let ticket = wb.begin_selection("photo.png");
    assert!(wb.finish_selection(ticket, pending_file("photo.png")).unwrap());
    wb
}
