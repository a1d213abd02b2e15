//! Canonical column names and the raw-header mapping table.
//!
//! INMET station exports have gone through several header dialects: the
//! pre-2019 exports carry accented, unit-suffixed names, the 2019+ exports
//! add a station preamble and slightly different spellings, and re-exports
//! produced by downstream tooling use the already-normalized short names.
//! Everything funnels into one canonical 11-column set here.

/// Canonical columns in schema order. `data` and `hora` form the natural key.
pub const CANONICAL_COLUMNS: [&str; 11] = [
    "data",
    "hora",
    "precipitacao_total",
    "pressao_atm_estacao",
    "temperatura_ar",
    "umidade_relativa",
    "vento_velocidade",
    "vento_direcao",
    "radiacao_global",
    "temperatura_max",
    "temperatura_min",
];

/// The nullable measurement columns, i.e. everything except the key.
pub const MEASUREMENT_COLUMNS: [&str; 9] = [
    "precipitacao_total",
    "pressao_atm_estacao",
    "temperatura_ar",
    "umidade_relativa",
    "vento_velocidade",
    "vento_direcao",
    "radiacao_global",
    "temperatura_max",
    "temperatura_min",
];

/// Known raw-header spellings, keyed by their form after [`normalize_header`].
///
/// Raw spellings that already match a canonical name pass through without an
/// entry here.
const HEADER_MAP: &[(&str, &str)] = &[
    // key columns
    ("horas", "hora"),
    ("hora_utc", "hora"),
    ("data_medicao", "data"),
    // pre-2019 dialect
    ("precipitação_total", "precipitacao_total"),
    (
        "pressao_atmosferica_ao_nivel_da_estacao,_horaria_(mb)",
        "pressao_atm_estacao",
    ),
    ("radiacao_global_(kj/m²)", "radiacao_global"),
    ("temperatura_do_ar_(°c)", "temperatura_ar"),
    ("umidade_relativa_do_ar,_horaria_(%)", "umidade_relativa"),
    ("vento_-_velocidade_horaria_(m/s)", "vento_velocidade"),
    ("vento_-_direção_horaria_(gr)", "vento_direcao"),
    ("temperatura_máxima_na_hora_ant._(°c)", "temperatura_max"),
    ("temperatura_mínima_na_hora_ant._(°c)", "temperatura_min"),
    // 2019+ dialect
    ("precipitação_total,_horário_(mm)", "precipitacao_total"),
    (
        "pressão_atmosférica_ao_nível_da_estação,_horária_(mb)",
        "pressao_atm_estacao",
    ),
    ("radiação_global_(kj/m²)", "radiacao_global"),
    ("radiacao_global_(w/m²)", "radiacao_global"),
    (
        "temperatura_do_ar_-_bulbo_seco,_horaria_(°c)",
        "temperatura_ar",
    ),
    ("umidade_relativa_do_ar,_horária_(%)", "umidade_relativa"),
    ("vento,_velocidade_horaria_(m/s)", "vento_velocidade"),
    ("vento,_direção_horaria_(gr)_(°_(gr))", "vento_direcao"),
    (
        "temperatura_máxima_na_hora_ant._(aut)_(°c)",
        "temperatura_max",
    ),
    (
        "temperatura_mínima_na_hora_ant._(aut)_(°c)",
        "temperatura_min",
    ),
];

/// Basic normalization applied to every raw header cell: trim, lowercase,
/// interior spaces to underscores.
pub fn normalize_header(raw: &str) -> String {
    raw.trim().to_lowercase().replace(' ', "_")
}

/// Map a normalized header onto its canonical name. Unknown headers pass
/// through unchanged; callers drop anything not in [`CANONICAL_COLUMNS`].
pub fn canonical_name(normalized: &str) -> &str {
    HEADER_MAP
        .iter()
        .find(|(raw, _)| *raw == normalized)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(normalized)
}

/// Whether a canonical name belongs to the relevant-column list.
pub fn is_canonical(name: &str) -> bool {
    CANONICAL_COLUMNS.contains(&name)
}
