//! Field metadata: canonical emission order and standard/custom split.
//!
//! A registry is built once and handed around by shared reference. The
//! built-in table is [`FieldRegistry::adif`]; a replacement can be loaded
//! from JSON of the form
//! `{"fields": [{"name": "call", "type": "string"}, ...]}`.

use std::{fs::File, io::BufReader, path::Path};

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::DataType::{
    self, Boolean as B, Date as D, Location as L, Number as N, String as S, Time as T,
};

/// Registry construction and loading failures.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Registry file could not be read.
    #[error("read field registry: {0}")]
    Io(#[from] std::io::Error),
    /// Registry JSON did not parse.
    #[error("parse field registry: {0}")]
    Json(#[from] serde_json::Error),
    /// Same name listed twice (after lowercasing).
    #[error("field {0:?} is listed more than once")]
    DuplicateField(String),
}

/// One registry entry as it appears in JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field name; lowercased on load.
    pub name: String,
    /// Declared data type.
    #[serde(rename = "type", default)]
    pub datatype: DataType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RegistryFile {
    fields: Vec<FieldSpec>,
}

/// Immutable ordered field table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRegistry {
    order: Vec<String>,
    types: HashMap<String, DataType>,
}

impl FieldRegistry {
    /// Builds a registry from specs in canonical order.
    pub fn new(specs: impl IntoIterator<Item = FieldSpec>) -> Result<Self, RegistryError> {
        let mut order = Vec::new();
        let mut types = HashMap::new();
        for spec in specs {
            let name = spec.name.to_ascii_lowercase();
            if types.insert(name.clone(), spec.datatype).is_some() {
                return Err(RegistryError::DuplicateField(name));
            }
            order.push(name);
        }
        Ok(Self { order, types })
    }

    /// Empty registry: every field is custom.
    pub fn empty() -> Self {
        Self {
            order: Vec::new(),
            types: HashMap::new(),
        }
    }

    /// Built-in ADIF 3 field table.
    pub fn adif() -> Self {
        let mut order = Vec::with_capacity(ADIF_FIELDS.len());
        let mut types = HashMap::with_capacity(ADIF_FIELDS.len());
        for &(name, datatype) in ADIF_FIELDS {
            order.push(name.to_string());
            types.insert(name.to_string(), datatype);
        }
        Self { order, types }
    }

    /// Parses a registry from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, RegistryError> {
        let file: RegistryFile = serde_json::from_str(json)?;
        Self::new(file.fields)
    }

    /// Loads a registry from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let rdr = BufReader::new(File::open(path)?);
        let file: RegistryFile = serde_json::from_reader(rdr)?;
        Self::new(file.fields)
    }

    /// Canonical field names in emission order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// True when `name` (already lowercase) is a registry field.
    pub fn is_standard(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Declared type of a registry field.
    pub fn datatype(&self, name: &str) -> Option<DataType> {
        self.types.get(name).copied()
    }

    /// Number of registry fields.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True for [`FieldRegistry::empty`].
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl Default for FieldRegistry {
    fn default() -> Self {
        Self::adif()
    }
}

const ADIF_FIELDS: &[(&str, DataType)] = &[
    ("address", S),
    ("address_intl", S),
    ("age", N),
    ("a_index", N),
    ("ant_az", N),
    ("ant_el", N),
    ("ant_path", S),
    ("arrl_sect", S),
    ("award_submitted", S),
    ("award_granted", S),
    ("band", S),
    ("band_rx", S),
    ("call", S),
    ("check", S),
    ("class", S),
    ("clublog_qso_upload_date", D),
    ("clublog_qso_upload_status", S),
    ("cnty", S),
    ("comment", S),
    ("comment_intl", S),
    ("cont", S),
    ("contacted_op", S),
    ("contest_id", S),
    ("country", S),
    ("country_intl", S),
    ("cqz", N),
    ("credit_submitted", S),
    ("credit_granted", S),
    ("darc_dok", S),
    ("distance", N),
    ("dxcc", N),
    ("email", S),
    ("eq_call", S),
    ("eqsl_qslrdate", D),
    ("eqsl_qslsdate", D),
    ("eqsl_qsl_rcvd", S),
    ("eqsl_qsl_sent", S),
    ("fists", N),
    ("fists_cc", N),
    ("force_init", B),
    ("freq", N),
    ("freq_rx", N),
    ("gridsquare", S),
    ("guest_op", S),
    ("hrdlog_qso_upload_date", D),
    ("hrdlog_qso_upload_status", S),
    ("iota", S),
    ("iota_island_id", N),
    ("ituz", N),
    ("k_index", N),
    ("lat", L),
    ("lon", L),
    ("lotw_qslrdate", D),
    ("lotw_qslsdate", D),
    ("lotw_qsl_rcvd", S),
    ("lotw_qsl_sent", S),
    ("max_bursts", N),
    ("mode", S),
    ("ms_shower", S),
    ("my_antenna", S),
    ("my_antenna_intl", S),
    ("my_city", S),
    ("my_city_intl", S),
    ("my_cnty", S),
    ("my_country", S),
    ("my_country_intl", S),
    ("my_cq_zone", N),
    ("my_dxcc", N),
    ("my_fists", N),
    ("my_gridsquare", S),
    ("my_iota", S),
    ("my_iota_island_id", N),
    ("my_itu_zone", N),
    ("my_lat", L),
    ("my_lon", L),
    ("my_name", S),
    ("my_name_intl", S),
    ("my_postal_code", S),
    ("my_postal_code_intl", S),
    ("my_rig", S),
    ("my_rig_intl", S),
    ("my_sig", S),
    ("my_sig_intl", S),
    ("my_sig_info", S),
    ("my_sig_info_intl", S),
    ("my_sota_ref", S),
    ("my_state", S),
    ("my_street", S),
    ("my_street_intl", S),
    ("my_usaca_counties", S),
    ("my_vucc_grids", S),
    ("name", S),
    ("name_intl", S),
    ("notes", S),
    ("notes_intl", S),
    ("nr_bursts", N),
    ("nr_pings", N),
    ("operator", S),
    ("owner_callsign", S),
    ("pfx", S),
    ("precedence", S),
    ("prop_mode", S),
    ("public_key", S),
    ("qrzcom_qso_upload_date", D),
    ("qrzcom_qso_upload_status", S),
    ("qslmsg", S),
    ("qslmsg_intl", S),
    ("qslrdate", D),
    ("qslsdate", D),
    ("qsl_rcvd", S),
    ("qsl_rcvd_via", S),
    ("qsl_sent", S),
    ("qsl_sent_via", S),
    ("qsl_via", S),
    ("qso_complete", S),
    ("qso_date", D),
    ("qso_date_off", D),
    ("qso_random", B),
    ("qth", S),
    ("qth_intl", S),
    ("region", S),
    ("rig", S),
    ("rig_intl", S),
    ("rst_rcvd", S),
    ("rst_sent", S),
    ("rx_pwr", N),
    ("sat_mode", S),
    ("sat_name", S),
    ("sfi", N),
    ("sig", S),
    ("sig_intl", S),
    ("sig_info", S),
    ("sig_info_intl", S),
    ("silent_key", B),
    ("skcc", S),
    ("sota_ref", S),
    ("srx", N),
    ("srx_string", S),
    ("state", S),
    ("station_callsign", S),
    ("stx", N),
    ("stx_string", S),
    ("submode", S),
    ("swl", B),
    ("ten_ten", N),
    ("time_off", T),
    ("time_on", T),
    ("tx_pwr", N),
    ("uksmg", N),
    ("usaca_counties", S),
    ("ve_prov", S),
    ("vucc_grids", S),
    ("web", S),
];
