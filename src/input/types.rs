use serde::{Deserialize, Serialize};

/// Categorical fields of a business record, in encoding order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CategoricalField {
    JenisUsaha,
    Marketplace,
    StatusLegalitas,
}

impl CategoricalField {
    pub const ALL: [CategoricalField; 3] = [
        CategoricalField::JenisUsaha,
        CategoricalField::Marketplace,
        CategoricalField::StatusLegalitas,
    ];

    /// Column name as used in the training data and the artifact.
    pub fn name(self) -> &'static str {
        match self {
            CategoricalField::JenisUsaha => "jenis_usaha",
            CategoricalField::Marketplace => "marketplace",
            CategoricalField::StatusLegalitas => "status_legalitas",
        }
    }

    /// Human-readable caption for listings
    pub fn caption(self) -> &'static str {
        match self {
            CategoricalField::JenisUsaha => "Jenis Usaha",
            CategoricalField::Marketplace => "Marketplace Utama",
            CategoricalField::StatusLegalitas => "Status Legalitas",
        }
    }
}

/// One business record as collected from the user.
///
/// Money fields are in Rupiah. `laba` (profit) may be negative; every other
/// numeric field is expected to be non-negative and `tahun_berdiri` to lie in
/// 1980..=2025. Those bounds are enforced by [`super::validate_input`], not
/// by the prediction pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawInput {
    pub jenis_usaha: String,
    pub marketplace: String,
    pub status_legalitas: String,
    pub laba: f64,
    pub biaya_karyawan: f64,
    pub omset: f64,
    pub aset: f64,
    pub tahun_berdiri: i32,
    pub tenaga_kerja_perempuan: u32,
    pub tenaga_kerja_laki_laki: u32,
    pub kapasitas_produksi: u64,
    pub jumlah_pelanggan: u64,
}

impl RawInput {
    /// Value of a categorical field
    pub fn categorical(&self, field: CategoricalField) -> &str {
        match field {
            CategoricalField::JenisUsaha => &self.jenis_usaha,
            CategoricalField::Marketplace => &self.marketplace,
            CategoricalField::StatusLegalitas => &self.status_legalitas,
        }
    }
}
