use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait};
use rodio::{OutputStream, OutputStreamBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use super::mixer::{MixerSource, MixerState};

/// Errors that can occur while opening the audio output.
#[derive(Debug, Error)]
pub enum AudioOutputError {
    /// No audio output devices are available on the host.
    #[error("No audio output devices found")]
    NoOutputDevices,
    /// Failed to enumerate output devices on the host.
    #[error("Could not list output devices: {source}")]
    ListOutputDevices {
        /// Underlying cpal error.
        source: cpal::DevicesError,
    },
    /// The preferred device could not be opened and neither could the default one.
    #[error("Failed to open default output stream: {source}")]
    OpenDefaultStream {
        /// Underlying rodio error.
        source: rodio::StreamError,
    },
}

/// Output device preferences from the config file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AudioOutputConfig {
    /// Preferred host identifier (e.g., "wasapi", "alsa").
    #[serde(default)]
    pub host: Option<String>,
    /// Preferred device name.
    #[serde(default)]
    pub device: Option<String>,
}

/// Device actually in use after opening the output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedOutput {
    pub host_id: String,
    pub device_name: String,
    /// Whether a fallback host or device was chosen.
    pub used_fallback: bool,
}

/// Open output stream feeding from the shared mixer.
pub(crate) struct OpenOutput {
    _stream: OutputStream,
    pub(crate) resolved: ResolvedOutput,
}

/// Open a stream on the preferred device (or the default) and attach the mixer.
pub(crate) fn open_output(
    config: &AudioOutputConfig,
    mixer: Arc<Mutex<MixerState>>,
) -> Result<OpenOutput, AudioOutputError> {
    let (host, host_id, host_fallback) = resolve_host(config.host.as_deref());
    let (device, device_name, device_fallback) = resolve_device(&host, config.device.as_deref())?;

    let opened = OutputStreamBuilder::from_device(device).and_then(|builder| builder.open_stream());
    let (stream, resolved) = match opened {
        Ok(stream) => (
            stream,
            ResolvedOutput {
                host_id,
                device_name,
                used_fallback: host_fallback || device_fallback,
            },
        ),
        Err(err) => {
            warn!("Opening \"{device_name}\" failed ({err}); using the default output");
            let stream = OutputStreamBuilder::open_default_stream()
                .map_err(|source| AudioOutputError::OpenDefaultStream { source })?;
            (
                stream,
                ResolvedOutput {
                    host_id: cpal::default_host().id().name().to_string(),
                    device_name: "Default device".to_string(),
                    used_fallback: true,
                },
            )
        }
    };
    stream.mixer().add(MixerSource::new(mixer));
    info!(
        "Audio output ready: host={} device=\"{}\" fallback={}",
        resolved.host_id, resolved.device_name, resolved.used_fallback
    );
    Ok(OpenOutput {
        _stream: stream,
        resolved,
    })
}

fn resolve_host(id: Option<&str>) -> (cpal::Host, String, bool) {
    let default_host = cpal::default_host();
    let default_id = default_host.id().name().to_string();
    let Some(requested) = id else {
        return (default_host, default_id, false);
    };
    let host = cpal::available_hosts()
        .into_iter()
        .find(|candidate| candidate.name().eq_ignore_ascii_case(requested))
        .and_then(|id| cpal::host_from_id(id).ok())
        .unwrap_or(default_host);
    let resolved_id = host.id().name().to_string();
    let used_fallback = !resolved_id.eq_ignore_ascii_case(requested);
    (host, resolved_id, used_fallback)
}

fn resolve_device(
    host: &cpal::Host,
    name: Option<&str>,
) -> Result<(cpal::Device, String, bool), AudioOutputError> {
    let default_device = host
        .default_output_device()
        .ok_or(AudioOutputError::NoOutputDevices)?;
    let default_name = default_device
        .name()
        .unwrap_or_else(|_| "Default device".into());
    let Some(requested) = name else {
        return Ok((default_device, default_name, false));
    };
    let chosen = host
        .output_devices()
        .map_err(|source| AudioOutputError::ListOutputDevices { source })?
        .find(|device| device.name().is_ok_and(|name| name == requested));
    match chosen {
        Some(device) => Ok((device, requested.to_string(), false)),
        None => {
            warn!("Output device \"{requested}\" not found; using \"{default_name}\"");
            Ok((default_device, default_name, true))
        }
    }
}
