use std::path::{Path, PathBuf};
use std::rc::Rc;

use gtk4 as gtk;
use gtk4::gdk;
use gtk4::gio;
use gtk4::prelude::*;

use birthday_surprise::config::Photo;
use birthday_surprise::error::{GreetingError, Result};
use birthday_surprise::music::{AudioOutput, Track};

/// Background music played through a `gtk::MediaFile`.
#[derive(Default)]
pub struct GtkAudio {
    stream: Option<gtk::MediaFile>,
    loaded: Option<PathBuf>,
    on_failure: Option<Rc<dyn Fn()>>,
}

impl GtkAudio {
    /// Called, from an idle callback, when a stream reports a late error.
    pub fn set_failure_hook(&mut self, hook: impl Fn() + 'static) {
        self.on_failure = Some(Rc::new(hook));
    }

    fn open(&mut self, path: &Path) -> gtk::MediaFile {
        if let Some(old) = self.stream.take() {
            old.pause();
        }
        let stream = gtk::MediaFile::for_filename(path);
        stream.set_loop(true);
        if let Some(hook) = self.on_failure.clone() {
            stream.connect_notify_local(Some("error"), move |stream, _| {
                if let Some(err) = stream.error() {
                    tracing::warn!(%err, "music stream failed");
                    let hook = hook.clone();
                    glib::idle_add_local_once(move || hook());
                }
            });
        }
        self.loaded = Some(path.to_path_buf());
        self.stream = Some(stream.clone());
        stream
    }
}

impl AudioOutput for GtkAudio {
    fn play(&mut self, track: &Track, volume: f64) -> Result<()> {
        if !track.path().is_file() {
            return Err(GreetingError::AudioUnavailable(track.path().display().to_string()));
        }
        let stream = match self.stream.clone() {
            Some(stream) if self.loaded.as_deref() == Some(track.path()) => stream,
            _ => self.open(track.path()),
        };
        if let Some(err) = stream.error() {
            return Err(GreetingError::AudioUnavailable(err.to_string()));
        }
        stream.set_volume(volume);
        stream.play();
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(stream) = &self.stream {
            stream.pause();
        }
    }
}

fn load_texture(path: &Path) -> Result<gdk::Texture> {
    gdk::Texture::from_file(&gio::File::for_path(path)).map_err(|err| {
        tracing::debug!(%err, path = %path.display(), "texture decode failed");
        GreetingError::MissingAsset(path.to_path_buf())
    })
}

/// A photo tile, or a captioned gradient placeholder when the image is
/// missing.
pub(super) fn photo_widget(photo: &Photo, placeholder: &str) -> gtk::Widget {
    let frame = gtk::Overlay::new();
    frame.add_css_class("photo-frame");

    match load_texture(&photo.path) {
        Ok(texture) => {
            let picture = gtk::Picture::for_paintable(&texture);
            picture.set_content_fit(gtk::ContentFit::Cover);
            picture.add_css_class("photo");
            frame.set_child(Some(&picture));
        }
        Err(err) => {
            tracing::warn!(%err, "photo failed to load, showing placeholder");
            let fallback = gtk::Box::new(gtk::Orientation::Vertical, 0);
            fallback.add_css_class("photo-placeholder");
            let label = gtk::Label::new(Some(placeholder));
            label.set_wrap(true);
            label.set_vexpand(true);
            label.set_valign(gtk::Align::Center);
            fallback.append(&label);
            frame.set_child(Some(&fallback));
        }
    }

    if let Some(caption) = &photo.caption {
        let label = gtk::Label::new(Some(caption));
        label.add_css_class("photo-caption");
        label.set_halign(gtk::Align::Center);
        label.set_valign(gtk::Align::End);
        frame.add_overlay(&label);
    }
    frame.upcast()
}
