use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "screenshot-annotator")]
#[command(about = "OCR, text repair and linguistic annotation for monitoring screenshots")]
#[command(version)]
pub struct Args {
    /// OCR engine to use ("auto", "ocrs", "leptess")
    #[arg(long, env = "OCR_ENGINE", default_value = "auto", global = true)]
    pub engine: String,

    /// Tesseract language string (e.g., "rus+eng")
    #[arg(long, env = "OCR_LANGUAGES", default_value = "rus+eng", global = true)]
    pub languages: String,

    /// Path to tessdata directory (downloaded to the cache directory if not set)
    #[arg(long, env = "TESSDATA_PREFIX", global = true)]
    pub tessdata_path: Option<String>,

    /// Directory for annotated diagnostic images
    #[arg(long, env = "TEMP_DIR", default_value = "temp", global = true)]
    pub scratch_dir: PathBuf,

    /// Supplementary vocabulary, one normalized word per line
    #[arg(long, env = "VOCABULARY_PATH", default_value = "ru.txt", global = true)]
    pub vocabulary: PathBuf,

    /// Russian Hunspell word list
    #[arg(long, env = "RU_DIC", default_value = "./pn/ru_RU.dic", global = true)]
    pub ru_dic: PathBuf,

    /// Russian Hunspell affix file
    #[arg(long, env = "RU_AFF", default_value = "./pn/ru_RU.aff", global = true)]
    pub ru_aff: PathBuf,

    /// English Hunspell word list
    #[arg(long, env = "EN_DIC", default_value = "./pn/en_US.dic", global = true)]
    pub en_dic: PathBuf,

    /// English Hunspell affix file
    #[arg(long, env = "EN_AFF", default_value = "./pn/en_US.aff", global = true)]
    pub en_aff: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the pipeline over HTTP
    Serve {
        /// Host address to bind to
        #[arg(long, env = "OCR_HOST", default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on
        #[arg(long, env = "OCR_PORT", default_value = "9292")]
        port: u16,

        /// Maximum file size in bytes (default: 50MB)
        #[arg(long, env = "OCR_MAX_FILE_SIZE", default_value = "52428800")]
        max_file_size: usize,
    },

    /// Process local images sequentially, skipping duplicates
    Run {
        /// Image files to process
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
}

/// Paths to a Hunspell `.dic` / `.aff` pair
#[derive(Debug, Clone)]
pub struct DictionaryPaths {
    pub dic: PathBuf,
    pub aff: PathBuf,
}

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub engine: String,
    pub languages: String,
    pub tessdata_path: Option<String>,
    pub scratch_dir: PathBuf,
    pub vocabulary_path: PathBuf,
    pub primary_dictionary: DictionaryPaths,
    pub secondary_dictionary: DictionaryPaths,
    pub host: String,
    pub port: u16,
    pub max_file_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine: "auto".to_string(),
            languages: "rus+eng".to_string(),
            tessdata_path: None,
            scratch_dir: PathBuf::from("temp"),
            vocabulary_path: PathBuf::from("ru.txt"),
            primary_dictionary: DictionaryPaths {
                dic: PathBuf::from("./pn/ru_RU.dic"),
                aff: PathBuf::from("./pn/ru_RU.aff"),
            },
            secondary_dictionary: DictionaryPaths {
                dic: PathBuf::from("./pn/en_US.dic"),
                aff: PathBuf::from("./pn/en_US.aff"),
            },
            host: "127.0.0.1".to_string(),
            port: 9292,
            max_file_size: 52_428_800,
        }
    }
}

impl Config {
    /// Tesseract language codes, e.g. `["rus", "eng"]`
    pub fn language_codes(&self) -> Vec<String> {
        self.languages
            .split('+')
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl From<&Args> for Config {
    fn from(args: &Args) -> Self {
        let mut config = Self {
            engine: args.engine.clone(),
            languages: args.languages.clone(),
            tessdata_path: args.tessdata_path.clone(),
            scratch_dir: args.scratch_dir.clone(),
            vocabulary_path: args.vocabulary.clone(),
            primary_dictionary: DictionaryPaths {
                dic: args.ru_dic.clone(),
                aff: args.ru_aff.clone(),
            },
            secondary_dictionary: DictionaryPaths {
                dic: args.en_dic.clone(),
                aff: args.en_aff.clone(),
            },
            ..Self::default()
        };

        if let Command::Serve {
            host,
            port,
            max_file_size,
        } = &args.command
        {
            config.host = host.clone();
            config.port = *port;
            config.max_file_size = *max_file_size;
        }

        config
    }
}
