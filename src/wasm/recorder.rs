use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{
    Blob, BlobEvent, BlobPropertyBag, CanvasCaptureMediaStreamTrack, HtmlAnchorElement,
    HtmlCanvasElement, MediaRecorder, MediaRecorderOptions, Url,
};

use crate::capture::{FrameSink, FrameStamp};
use crate::config::CaptureConfig;
use crate::error::{DemoError, Result};

/// Records the canvas through `MediaRecorder`. The stream is opened with a
/// frame rate of zero so frames enter it only when `capture` asks for one.
pub struct MediaRecorderSink {
    canvas: HtmlCanvasElement,
    settings: CaptureConfig,
    active: Option<Recording>,
    last_stamp: Option<FrameStamp>,
}

struct Recording {
    recorder: MediaRecorder,
    track: CanvasCaptureMediaStreamTrack,
    chunks: Rc<RefCell<Vec<Blob>>>,
    on_data: Closure<dyn FnMut(BlobEvent)>,
}

impl MediaRecorderSink {
    pub fn new(canvas: HtmlCanvasElement, settings: CaptureConfig) -> Self {
        Self {
            canvas,
            settings,
            active: None,
            last_stamp: None,
        }
    }

    /// Last frame handed to the encoder in the current or previous capture.
    pub fn last_stamp(&self) -> Option<FrameStamp> {
        self.last_stamp
    }
}

impl FrameSink for MediaRecorderSink {
    fn start(&mut self) -> Result<()> {
        let mime = self.settings.mime_type;
        if !MediaRecorder::is_type_supported(mime) {
            return Err(DemoError::Capture(format!("{mime} not supported")));
        }

        let stream = self.canvas.capture_stream_with_frame_request_rate(0.0)?;
        let track = stream
            .get_video_tracks()
            .get(0)
            .dyn_into::<CanvasCaptureMediaStreamTrack>()
            .map_err(|_| DemoError::Capture("canvas stream has no video track".into()))?;

        let options = MediaRecorderOptions::new();
        options.set_mime_type(mime);
        let recorder = MediaRecorder::new_with_media_stream_and_media_recorder_options(
            &stream, &options,
        )?;

        let chunks = Rc::new(RefCell::new(Vec::new()));
        let on_data = {
            let chunks = chunks.clone();
            Closure::<dyn FnMut(BlobEvent)>::new(move |event: BlobEvent| {
                if let Some(blob) = event.data() {
                    if blob.size() > 0.0 {
                        chunks.borrow_mut().push(blob);
                    }
                }
            })
        };
        recorder.set_ondataavailable(Some(on_data.as_ref().unchecked_ref()));
        recorder.start()?;

        self.last_stamp = None;
        self.active = Some(Recording {
            recorder,
            track,
            chunks,
            on_data,
        });
        Ok(())
    }

    fn capture(&mut self, stamp: FrameStamp) -> Result<()> {
        let recording = self
            .active
            .as_ref()
            .ok_or_else(|| DemoError::Capture("recorder not started".into()))?;
        recording.track.request_frame();
        self.last_stamp = Some(stamp);
        Ok(())
    }

    fn save(&mut self, file_name: &str) -> Result<()> {
        let Recording {
            recorder,
            track,
            chunks,
            on_data,
        } = self
            .active
            .take()
            .ok_or_else(|| DemoError::Capture("recorder not started".into()))?;

        if let Some(stamp) = self.last_stamp {
            log::debug!(
                "finalizing {file_name} after frame {} ({:.0}us)",
                stamp.index,
                stamp.timestamp_us
            );
        }

        // The final chunk is delivered asynchronously before `stop` fires,
        // so the download is assembled there.
        let mime = self.settings.mime_type;
        let file_name = file_name.to_string();
        let on_stop = Closure::once_into_js(move || {
            let _keep_alive = on_data;
            track.stop();
            if let Err(err) = download(&chunks.borrow(), mime, &file_name) {
                log::error!("saving {file_name} failed: {err}");
            }
        });
        recorder.set_onstop(Some(on_stop.unchecked_ref()));
        recorder.stop()?;
        Ok(())
    }
}

fn download(chunks: &[Blob], mime: &str, file_name: &str) -> Result<()> {
    let parts = js_sys::Array::new();
    for chunk in chunks {
        parts.push(chunk);
    }
    let bag = BlobPropertyBag::new();
    bag.set_type(mime);
    let blob = Blob::new_with_blob_sequence_and_options(&parts, &bag)?;
    let url = Url::create_object_url_with_blob(&blob)?;

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or(DemoError::MissingElement("document"))?;
    let anchor: HtmlAnchorElement = document
        .create_element("a")?
        .dyn_into()
        .map_err(|_| DemoError::Js("anchor element has unexpected type".into()))?;
    anchor.set_href(&url);
    anchor.set_download(file_name);
    anchor.click();
    Url::revoke_object_url(&url)?;

    log::info!("downloaded {file_name} ({:.0} bytes)", blob.size());
    Ok(())
}
