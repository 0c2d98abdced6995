use std::io::{self, Write};

use super::config::{OutputConfig, OutputFormat};
use crate::meta::{self, SongMeta};

pub trait Presenter: Send + Sync {
    fn emit(&self, songs: &[SongMeta], w: &mut dyn Write) -> io::Result<()>;
}

pub struct TsvPresenter;
impl Presenter for TsvPresenter {
    fn emit(&self, songs: &[SongMeta], w: &mut dyn Write) -> io::Result<()> {
        writeln!(w, "{}", meta::to_tsv(songs))
    }
}

pub struct JsonPresenter;
impl Presenter for JsonPresenter {
    fn emit(&self, songs: &[SongMeta], w: &mut dyn Write) -> io::Result<()> {
        let s = meta::to_json(songs).map_err(to_io)?;
        writeln!(w, "{}", s)
    }
}

pub struct Emitter {
    presenter: Box<dyn Presenter>,
}

impl Emitter {
    pub fn from_config(cfg: OutputConfig) -> Self {
        let presenter: Box<dyn Presenter> = match cfg.format {
            OutputFormat::Json => Box::new(JsonPresenter),
            OutputFormat::Tsv => Box::new(TsvPresenter),
        };
        Emitter { presenter }
    }

    pub fn emit(&self, songs: &[SongMeta]) -> io::Result<()> {
        let mut out = io::stdout();
        self.emit_to(songs, &mut out)
    }

    pub fn emit_to(&self, songs: &[SongMeta], w: &mut dyn Write) -> io::Result<()> {
        self.presenter.emit(songs, w)?;
        w.flush()
    }
}

fn to_io(e: serde_json::Error) -> io::Error { io::Error::other(e) }
