use std::env;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Tsv,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

impl OutputConfig {
    pub fn from_env() -> Self {
        Self::from_value(env::var("MMS_OUTPUT_FORMAT").ok().as_deref())
    }

    /// `--json` wins over the environment.
    pub fn resolve(prefer_json: bool) -> Self {
        if prefer_json { OutputConfig { format: OutputFormat::Json } } else { Self::from_env() }
    }

    fn from_value(v: Option<&str>) -> Self {
        let format = match v {
            Some(v) if v.eq_ignore_ascii_case("json") => OutputFormat::Json,
            _ => OutputFormat::Tsv,
        };
        OutputConfig { format }
    }

    pub fn prefers_json(&self) -> bool { self.format == OutputFormat::Json }
}
