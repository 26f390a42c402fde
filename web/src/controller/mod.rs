pub(crate) mod audio_file_controller;
pub(crate) mod health_check_controller;
pub(crate) mod pattern_controller;
