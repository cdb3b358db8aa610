use crate::constants::{ANALYSER_SMOOTHING, FFT_SIZE};
use sgraffito_core::{Capability, CapabilityError, CapabilityState, Granted, SpectrumSource};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

/// Live microphone graph: stream → source → analyser.
pub struct MicStream {
    ctx: web::AudioContext,
    stream: web::MediaStream,
    analyser: web::AnalyserNode,
}

impl MicStream {
    /// Ask for the microphone and build the analyser graph.
    pub async fn open() -> Result<MicStream, CapabilityError> {
        let unsupported = CapabilityError::Unsupported(Capability::Microphone);
        let window = web::window().ok_or(unsupported.clone())?;
        let devices = window
            .navigator()
            .media_devices()
            .map_err(|_| unsupported.clone())?;

        let constraints = web::MediaStreamConstraints::new();
        constraints.set_audio(&JsValue::TRUE);
        let promise = devices
            .get_user_media_with_constraints(&constraints)
            .map_err(|_| unsupported.clone())?;
        let stream: web::MediaStream = JsFuture::from(promise)
            .await
            .map_err(|e| {
                log::warn!("[audio] getUserMedia rejected: {:?}", e);
                CapabilityError::Denied(Capability::Microphone)
            })?
            .dyn_into()
            .map_err(|_| unsupported.clone())?;

        let build = || -> Result<MicStream, JsValue> {
            let ctx = web::AudioContext::new()?;
            let source = ctx.create_media_stream_source(&stream)?;
            let analyser = ctx.create_analyser()?;
            analyser.set_fft_size(FFT_SIZE);
            analyser.set_smoothing_time_constant(ANALYSER_SMOOTHING);
            source.connect_with_audio_node(&analyser)?;
            _ = ctx.resume();
            Ok(MicStream {
                ctx,
                stream: stream.clone(),
                analyser,
            })
        };
        build().map_err(|e| {
            log::error!("[audio] analyser graph: {:?}", e);
            stop_tracks(&stream);
            unsupported
        })
    }

    fn close(self) {
        stop_tracks(&self.stream);
        _ = self.ctx.close();
    }
}

fn stop_tracks(stream: &web::MediaStream) {
    for track in stream.get_tracks().iter() {
        if let Ok(track) = track.dyn_into::<web::MediaStreamTrack>() {
            track.stop();
        }
    }
}

/// Microphone as a [`SpectrumSource`]; off until a request succeeds.
#[derive(Default)]
pub struct MicSource {
    stream: Option<MicStream>,
    bins: Vec<u8>,
    state: CapabilityState,
}

impl MicSource {
    pub fn state(&self) -> &CapabilityState {
        &self.state
    }

    pub fn set_pending(&mut self) {
        self.state = CapabilityState::Pending;
    }

    /// Store the outcome of [`MicStream::open`].
    pub fn attach(&mut self, result: Result<MicStream, CapabilityError>) {
        match result {
            Ok(stream) => {
                self.bins = vec![0; stream.analyser.frequency_bin_count() as usize];
                self.stream = Some(stream);
                self.state = CapabilityState::from_request(Ok(Granted(Capability::Microphone)));
            }
            Err(e) => {
                self.stream = None;
                self.state = CapabilityState::from_request(Err(e));
            }
        }
    }

    pub fn stop(&mut self) {
        if let Some(stream) = self.stream.take() {
            stream.close();
            log::info!("[audio] microphone off");
        }
        self.state = CapabilityState::Off;
    }
}

impl SpectrumSource for MicSource {
    fn is_active(&self) -> bool {
        self.state.is_active() && self.stream.is_some()
    }

    fn latest_spectrum(&mut self) -> Option<&[u8]> {
        let stream = self.stream.as_ref()?;
        stream.analyser.get_byte_frequency_data(&mut self.bins);
        Some(&self.bins)
    }
}
