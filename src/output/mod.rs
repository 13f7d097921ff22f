pub mod formatter;

pub use formatter::{
    format_age, format_clinic_detail, format_explanation, format_index, format_json,
    format_ranked_table, format_tsv, should_use_colors, ClinicResource,
};
