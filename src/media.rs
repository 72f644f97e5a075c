use crate::types::Gesture;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ActionError {
    #[cfg(feature = "uinput")]
    #[error("uinput error: {0}")]
    Uinput(#[from] uinput::Error),

    #[error("Key sink unavailable: {0}")]
    Unavailable(String),
}

/// Teclas multimedia que puede emitir el controlador
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKey {
    PlayPause,
    NextTrack,
    PreviousTrack,
    VolumeUp,
    VolumeDown,
    Mute,
}

/// Destino de las pulsaciones. El controlador no sabe cómo llegan al sistema.
pub trait KeySink {
    fn tap(&mut self, key: MediaKey) -> Result<(), ActionError>;
}

impl<T: KeySink + ?Sized> KeySink for Box<T> {
    fn tap(&mut self, key: MediaKey) -> Result<(), ActionError> {
        (**self).tap(key)
    }
}

/// Tipo de sink elegido en la configuración
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// Solo registra las teclas en el log
    #[default]
    Log,
    /// Teclado virtual en /dev/uinput (requiere la feature `uinput`)
    Uinput,
}

/// Sink sin efectos: registra cada tecla con tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl KeySink for LogSink {
    fn tap(&mut self, key: MediaKey) -> Result<(), ActionError> {
        info!(?key, "tecla multimedia");
        Ok(())
    }
}

#[cfg(feature = "uinput")]
pub use self::uinput_sink::UinputSink;

#[cfg(feature = "uinput")]
mod uinput_sink {
    use super::{ActionError, KeySink, MediaKey};
    use std::time::Duration;
    use uinput::device::Device;
    use uinput::event::keyboard::{Keyboard, Misc};

    pub struct UinputSink {
        dev: Device,
    }

    impl UinputSink {
        pub fn new() -> Result<Self, ActionError> {
            let dev = uinput::default()?
                .name("quiromedia-keys")?
                .event(uinput::event::Keyboard::All)?
                .create()?;

            Ok(UinputSink { dev })
        }

        fn sync(&mut self) -> Result<(), ActionError> {
            Ok(self.dev.synchronize()?)
        }
    }

    impl KeySink for UinputSink {
        fn tap(&mut self, key: MediaKey) -> Result<(), ActionError> {
            let code = match key {
                MediaKey::PlayPause => Misc::PlayPause,
                MediaKey::NextTrack => Misc::NextSong,
                MediaKey::PreviousTrack => Misc::PreviousSong,
                MediaKey::VolumeUp => Misc::VolumeUp,
                MediaKey::VolumeDown => Misc::VolumeDown,
                MediaKey::Mute => Misc::Mute,
            };
            self.dev.press(&Keyboard::Misc(code))?;
            self.sync()?;
            std::thread::sleep(Duration::from_millis(10));
            self.dev.release(&Keyboard::Misc(code))?;
            self.sync()
        }
    }
}

pub const DEFAULT_VOLUME_STEPS: u32 = 2;

/// Traduce gestos a teclas multimedia y lleva el estado reproducción/silencio
pub struct MediaController<S: KeySink> {
    sink: S,
    volume_steps: u32,
    is_muted: bool,
    is_playing: bool,
}

impl<S: KeySink> MediaController<S> {
    pub fn new(sink: S, volume_steps: u32) -> Self {
        Self {
            sink,
            volume_steps,
            is_muted: false,
            is_playing: true,
        }
    }

    /// Ejecuta la acción asociada. `Ok(false)` si el gesto no tiene acción.
    pub fn execute(&mut self, gesture: Gesture) -> Result<bool, ActionError> {
        match gesture {
            Gesture::SwipeRight => self.next_track()?,
            Gesture::SwipeLeft => self.previous_track()?,
            Gesture::Pinch => self.play_pause()?,
            Gesture::VolumeUp => self.volume_up()?,
            Gesture::VolumeDown => self.volume_down()?,
            Gesture::Fist => self.mute()?,
            Gesture::OpenPalm => self.unmute()?,
            Gesture::None => return Ok(false),
        }
        Ok(true)
    }

    pub fn play_pause(&mut self) -> Result<(), ActionError> {
        self.sink.tap(MediaKey::PlayPause)?;
        self.is_playing = !self.is_playing;
        debug!(playing = self.is_playing, "play/pause");
        Ok(())
    }

    pub fn next_track(&mut self) -> Result<(), ActionError> {
        self.sink.tap(MediaKey::NextTrack)
    }

    pub fn previous_track(&mut self) -> Result<(), ActionError> {
        self.sink.tap(MediaKey::PreviousTrack)
    }

    pub fn volume_up(&mut self) -> Result<(), ActionError> {
        for _ in 0..self.volume_steps {
            self.sink.tap(MediaKey::VolumeUp)?;
        }
        Ok(())
    }

    pub fn volume_down(&mut self) -> Result<(), ActionError> {
        for _ in 0..self.volume_steps {
            self.sink.tap(MediaKey::VolumeDown)?;
        }
        Ok(())
    }

    /// Silencia solo si no lo estaba (la tecla de silencio alterna)
    pub fn mute(&mut self) -> Result<(), ActionError> {
        if !self.is_muted {
            self.sink.tap(MediaKey::Mute)?;
            self.is_muted = true;
        }
        Ok(())
    }

    pub fn unmute(&mut self) -> Result<(), ActionError> {
        if self.is_muted {
            self.sink.tap(MediaKey::Mute)?;
            self.is_muted = false;
        }
        Ok(())
    }

    pub fn is_muted(&self) -> bool {
        self.is_muted
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    /// "Playing | Unmuted", etc.
    pub fn status(&self) -> String {
        let play_status = if self.is_playing { "Playing" } else { "Paused" };
        let mute_status = if self.is_muted { "Muted" } else { "Unmuted" };
        format!("{} | {}", play_status, mute_status)
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

/// Sink de prueba: guarda las teclas y puede fallar a demanda
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingSink {
    pub keys: Vec<MediaKey>,
    pub failures_left: usize,
}

#[cfg(test)]
impl KeySink for RecordingSink {
    fn tap(&mut self, key: MediaKey) -> Result<(), ActionError> {
        if self.failures_left > 0 {
            self.failures_left -= 1;
            return Err(ActionError::Unavailable("simulated".to_string()));
        }
        self.keys.push(key);
        Ok(())
    }
}
