//! Subtitle burn-in pipeline.
//!
//! Bounded contexts follow a `domain` / `infrastructure` split: domain
//! modules hold types, traits and pure logic, infrastructure modules hold
//! the adapters that touch processes and the filesystem. Use cases in
//! `pipeline` wire them together.

pub mod shared {
    pub mod constants;
}

pub mod style {
    pub mod domain {
        pub mod frame_rate;
        pub mod style_error;
        pub mod style_translator;
        pub mod subtitle_style;
    }
    pub mod infrastructure;
}

pub mod subtitle {
    pub mod domain {
        pub mod subtitle_asset;
    }
}

pub mod video {
    pub mod domain {
        pub mod video_asset;
    }
}

pub mod engine {
    pub mod domain {
        pub mod staging_area;
        pub mod transcode_engine;
    }
    pub mod infrastructure;

    #[cfg(test)]
    pub(crate) mod fake_engine;
}

pub mod filter {
    pub mod domain {
        pub mod filter_graph;
    }
}

pub mod delivery {
    pub mod domain {
        pub mod artifact_sink;
    }
    pub mod infrastructure {
        pub mod file_artifact_sink;
    }
}

pub mod pipeline {
    pub mod burn_subtitles_use_case;
    pub mod detect_frame_rate_use_case;
    pub mod job;
    pub mod pipeline_error;
    pub mod pipeline_logger;
}
