//! Feature engineering: raw record to classifier input.
//!
//! ```text
//!   RawInput ──► Ratios ──────────────┐
//!      │                              ▼
//!      └──────► engineer ──► EngineeredFeatures
//!                                     │ one_hot_encode
//!                                     ▼
//!                                EncodedRow
//!                                     │ align (train_columns + policy)
//!                                     ▼
//!                               FeatureMatrix
//! ```

pub mod encoding;
pub mod engineer;
pub mod matrix;
pub mod ratios;

pub use encoding::{
    align, align_with_policy, indicator_column, one_hot_encode, Alignment, EncodedRow,
    EncodingError, UnseenCategoryPolicy,
};
pub use engineer::{engineer, log_transform, EngineeredFeatures, LOG_TRANSFORM_COLUMNS, REFERENCE_YEAR};
pub use matrix::FeatureMatrix;
pub use ratios::Ratios;

#[cfg(test)]
pub(crate) mod tests {
    use crate::input::RawInput;

    /// The default record of the input form
    pub fn sample_input() -> RawInput {
        RawInput {
            jenis_usaha: "Kuliner".to_string(),
            marketplace: "Shopee".to_string(),
            status_legalitas: "NIB".to_string(),
            laba: 5_000_000.0,
            biaya_karyawan: 2_000_000.0,
            omset: 30_000_000.0,
            aset: 50_000_000.0,
            tahun_berdiri: 2020,
            tenaga_kerja_perempuan: 3,
            tenaga_kerja_laki_laki: 3,
            kapasitas_produksi: 500,
            jumlah_pelanggan: 150,
        }
    }
}
