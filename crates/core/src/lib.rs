mod apply;
mod collision;
mod config;
mod date_format;
mod month;
mod normalize;
mod pattern;
mod planner;

pub use apply::{apply_pairs, ApplyResult};
pub use collision::{
    insert_counter, resolve_collisions, resolve_collisions_counted, CollisionError, RenamePair,
    Resolution,
};
pub use config::{
    app_paths, load_config, load_config_from, save_config, save_config_to, AppConfig, AppPaths,
};
pub use date_format::{
    compile, parse_mode, CompiledDatePattern, DateField, DateFormatError, DatePatternOptions,
    ExtractedDate, FieldToken, DEFAULT_INPUT_SEPARATORS,
};
pub use month::resolve_month;
pub use normalize::{
    normalize_date, rewrite_date, CenturyRule, NormalizeError, NormalizeOptions,
    DEFAULT_CENTURY_PREFIX, DEFAULT_OUTPUT_SEPARATOR,
};
pub use pattern::{apply_rules, load_pattern_file, parse_pattern_list, PatternError, PatternRule};
pub use planner::{generate_plan, RenamePlan, RenameRule, RenameStats};
