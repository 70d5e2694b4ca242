//! Zoom-dependent prefilter scripts for tippecanoe.
//!
//! tippecanoe pipes the features of every tile through the `-C` command with
//! the zoom level as first argument. The script thins contour lines at low
//! zoom so overview tiles stay readable:
//!
//! | Zoom | Metric kept | Imperial kept |
//! |---|---|---|
//! | `<= min_zoom` | every 50 m | every 200 ft |
//! | `min_zoom + 1` | every 20 m | every 80 ft |
//! | higher | all | all |
//!
//! Scripts live in the output directory for the duration of a batch.

use std::path::PathBuf;

use futures::future::join_all;
use tracing::debug;

use super::remove_file_if_exists;
use crate::config::BatchConfig;
use crate::error::{ContourError, ContourResult};
use crate::units::UnitSystem;

/// Shell source of the prefilter for a unit system.
pub fn prefilter_script(unit: UnitSystem, min_zoom: u8) -> String {
    let attribute = unit.elevation_attribute();
    let (coarse, medium) = unit.prefilter_steps();

    format!(
        "#!/usr/bin/env bash\n\
         if [[ $1 -le {low} ]]; then\n    \
             jq -c \"if .properties.{attr} % {coarse} == 0 then . else {{}} end\"\n\
         elif [[ $1 -eq {mid} ]]; then\n    \
             jq -c \"if .properties.{attr} % {medium} == 0 then . else {{}} end\"\n\
         else\n    \
             cat\n\
         fi\n",
        low = min_zoom,
        mid = u16::from(min_zoom) + 1,
        attr = attribute,
        coarse = coarse,
        medium = medium,
    )
}

/// Writes one executable prefilter script per configured unit system.
pub async fn write_prefilter_scripts(config: &BatchConfig) -> ContourResult<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(config.settings.units.len());

    for &unit in &config.settings.units {
        let path = config.prefilter_script_path(unit);
        let source = prefilter_script(unit, config.settings.min_zoom);

        tokio::fs::write(&path, source)
            .await
            .map_err(|e| ContourError::io(&path, e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
                .await
                .map_err(|e| ContourError::io(&path, e))?;
        }

        debug!(unit = %unit, path = %path.display(), "Wrote prefilter script");
        written.push(path);
    }

    Ok(written)
}

/// Removes the prefilter scripts of every unit system.
pub async fn remove_prefilter_scripts(config: &BatchConfig) -> ContourResult<()> {
    let paths: Vec<PathBuf> = UnitSystem::ALL
        .iter()
        .map(|&unit| config.prefilter_script_path(unit))
        .collect();

    join_all(paths.iter().map(|p| remove_file_if_exists(p)))
        .await
        .into_iter()
        .collect::<ContourResult<Vec<()>>>()?;

    Ok(())
}
