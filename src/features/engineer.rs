use log::debug;

use super::ratios::Ratios;
use crate::artifact::MinValues;
use crate::input::RawInput;

/// Frozen modeling constant; business age is measured against this year,
/// never the wall clock.
pub const REFERENCE_YEAR: i32 = 2025;

/// Columns compressed with `log1p` before prediction.
pub const LOG_TRANSFORM_COLUMNS: [&str; 4] = ["aset", "omset", "biaya_karyawan", "kapasitas_produksi"];

/// A record after ratio, log and derived-scalar engineering, before encoding.
///
/// Numeric fields carry the name of the training column they feed. The four
/// columns in [`LOG_TRANSFORM_COLUMNS`] hold transformed values.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineeredFeatures {
    pub jenis_usaha: String,
    pub marketplace: String,
    pub status_legalitas: String,
    pub laba: f64,
    pub biaya_karyawan: f64,
    pub omset: f64,
    pub aset: f64,
    pub tahun_berdiri: f64,
    pub tenaga_kerja_perempuan: f64,
    pub tenaga_kerja_laki_laki: f64,
    pub kapasitas_produksi: f64,
    pub jumlah_pelanggan: f64,
    pub profit_margin: f64,
    pub asset_turnover: f64,
    pub lama_usaha: f64,
    pub total_tenaga_kerja: f64,
}

impl EngineeredFeatures {
    /// Numeric columns in the order the training frame had them
    pub fn numeric_columns(&self) -> [(&'static str, f64); 13] {
        [
            ("laba", self.laba),
            ("biaya_karyawan", self.biaya_karyawan),
            ("omset", self.omset),
            ("aset", self.aset),
            ("tahun_berdiri", self.tahun_berdiri),
            ("tenaga_kerja_perempuan", self.tenaga_kerja_perempuan),
            ("tenaga_kerja_laki_laki", self.tenaga_kerja_laki_laki),
            ("kapasitas_produksi", self.kapasitas_produksi),
            ("jumlah_pelanggan", self.jumlah_pelanggan),
            ("profit_margin", self.profit_margin),
            ("asset_turnover", self.asset_turnover),
            ("lama_usaha", self.lama_usaha),
            ("total_tenaga_kerja", self.total_tenaga_kerja),
        ]
    }

    /// Categorical columns with their values
    pub fn categorical_columns(&self) -> [(&'static str, &str); 3] {
        [
            ("jenis_usaha", &self.jenis_usaha),
            ("marketplace", &self.marketplace),
            ("status_legalitas", &self.status_legalitas),
        ]
    }
}

/// `log1p` with the training-time shift applied when a minimum is known.
///
/// With a minimum `m` the value becomes `log1p(v - m + 1)`; for `v >= m` the
/// argument is at least 1. Without one the raw value is used directly.
pub fn log_transform(value: f64, min_value: Option<f64>) -> f64 {
    match min_value {
        Some(min) => (value - min + 1.0).ln_1p(),
        None => value.ln_1p(),
    }
}

/// Derive every engineered feature from one raw record.
pub fn engineer(input: &RawInput, ratios: &Ratios, min_values: &MinValues) -> EngineeredFeatures {
    let transform = |column: &str, value: f64| {
        let min = min_values.get(column).copied();
        if min.is_none() {
            // Kept for parity with training; may hide a train/serve skew.
            debug!("No minimum recorded for '{}', applying log1p to the raw value", column);
        }
        log_transform(value, min)
    };

    EngineeredFeatures {
        jenis_usaha: input.jenis_usaha.clone(),
        marketplace: input.marketplace.clone(),
        status_legalitas: input.status_legalitas.clone(),
        laba: input.laba,
        biaya_karyawan: transform("biaya_karyawan", input.biaya_karyawan),
        omset: transform("omset", input.omset),
        aset: transform("aset", input.aset),
        tahun_berdiri: f64::from(input.tahun_berdiri),
        tenaga_kerja_perempuan: f64::from(input.tenaga_kerja_perempuan),
        tenaga_kerja_laki_laki: f64::from(input.tenaga_kerja_laki_laki),
        kapasitas_produksi: transform("kapasitas_produksi", input.kapasitas_produksi as f64),
        jumlah_pelanggan: input.jumlah_pelanggan as f64,
        profit_margin: ratios.profit_margin,
        asset_turnover: ratios.asset_turnover,
        lama_usaha: f64::from(REFERENCE_YEAR) - f64::from(input.tahun_berdiri),
        total_tenaga_kerja: f64::from(input.tenaga_kerja_perempuan)
            + f64::from(input.tenaga_kerja_laki_laki),
    }
}
