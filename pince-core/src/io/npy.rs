// Copyright (c) 2025-2026, Tom Ouellette
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// A copy of the License has been included in the root of the repository.

use std::fs::File;
use std::io::{self, Read, Seek};
use std::path::Path;

use npyz::npz::{self, NpzArchive};
use npyz::WriterBuilder;
use zip::write::ExtendedFileOptions;

use crate::constant::{
    NPZ_ANGLE, NPZ_COS, NPZ_POS, NPZ_QUALITY, NPZ_ROTATION, NPZ_SIN, NPZ_WIDTH, NPZ_ZOOM,
};
use crate::error::PinceError;
use crate::gr::{HeatMaps, Prediction};

type Array = (Vec<u64>, Vec<f32>);

/// Read a named array from a .npz archive as f32
///
/// Single and double precision arrays are accepted. Returns `None` if the
/// archive has no array with the given name.
fn read_array<R: Read + Seek>(
    archive: &mut NpzArchive<R>,
    name: &str,
) -> Result<Option<Array>, PinceError> {
    let read_error = |err: io::Error| PinceError::MapsReadError(format!("{}: {}", name, err));

    let Some(npy) = archive.by_name(name).map_err(read_error)? else {
        return Ok(None);
    };

    let shape = npy.shape().to_vec();

    if let Ok(data) = npy.into_vec::<f32>() {
        return Ok(Some((shape, data)));
    }

    let npy = archive
        .by_name(name)
        .map_err(read_error)?
        .ok_or_else(|| PinceError::MapsReadError(format!("{}: array disappeared", name)))?;

    let data = npy.into_vec::<f64>().map_err(|_| {
        PinceError::MapsReadError(format!("{}: only f32 and f64 arrays are supported", name))
    })?;

    Ok(Some((shape, data.into_iter().map(|v| v as f32).collect())))
}

/// Reduce a shape such as (1, 1, H, W) to (H, W)
fn squeeze_2d(shape: &[u64]) -> Option<(usize, usize)> {
    if shape.len() < 2 || shape[..shape.len() - 2].iter().any(|&d| d != 1) {
        return None;
    }

    Some((
        shape[shape.len() - 2] as usize,
        shape[shape.len() - 1] as usize,
    ))
}

fn require_map<R: Read + Seek>(
    archive: &mut NpzArchive<R>,
    name: &str,
    shape: (usize, usize),
) -> Result<Vec<f32>, PinceError> {
    let (array_shape, data) = read_array(archive, name)?
        .ok_or_else(|| PinceError::MapsReadError(format!("Missing array '{}'", name)))?;

    if squeeze_2d(&array_shape) != Some(shape) {
        return Err(PinceError::ShapeError);
    }

    Ok(data)
}

fn read_scalar<R: Read + Seek>(
    archive: &mut NpzArchive<R>,
    name: &str,
    default: f32,
) -> Result<f32, PinceError> {
    match read_array(archive, name)? {
        Some((_, data)) if data.len() == 1 => Ok(data[0]),
        Some(_) => Err(PinceError::MapsReadError(format!(
            "Array '{}' must hold a single value",
            name
        ))),
        None => Ok(default),
    }
}

/// Read network predictions for one image from a .npz file
///
/// The archive either holds post-processed maps named `q`, `angle`, and
/// `width`, or raw network outputs named `pos`, `cos`, `sin`, and `width`
/// which are post-processed with [`HeatMaps::from_raw`]. Arrays must be 2D
/// up to leading singleton dimensions. Optional scalars `rot` and `zoom`
/// record the transform applied to the network input (defaults 0 and 1).
///
/// # Arguments
///
/// * `path` - Path to a .npz file
/// * `width_scale` - Pixels per unit of raw width (ignored for post-processed maps)
pub fn read_prediction_npz<P: AsRef<Path>>(
    path: P,
    width_scale: f32,
) -> Result<Prediction, PinceError> {
    let path = path.as_ref();

    if !path.is_file() {
        return Err(PinceError::NoFileError(path.display().to_string()));
    }

    let mut archive = NpzArchive::open(path)
        .map_err(|err| PinceError::MapsReadError(format!("{}: {}", path.display(), err)))?;

    let maps = if let Some((shape, quality)) = read_array(&mut archive, NPZ_QUALITY)? {
        let (height, width) = squeeze_2d(&shape).ok_or(PinceError::ShapeError)?;
        let angle = require_map(&mut archive, NPZ_ANGLE, (height, width))?;
        let width_map = require_map(&mut archive, NPZ_WIDTH, (height, width))?;
        HeatMaps::new(height, width, quality, angle, width_map)?
    } else if let Some((shape, pos)) = read_array(&mut archive, NPZ_POS)? {
        let (height, width) = squeeze_2d(&shape).ok_or(PinceError::ShapeError)?;
        let cos = require_map(&mut archive, NPZ_COS, (height, width))?;
        let sin = require_map(&mut archive, NPZ_SIN, (height, width))?;
        let raw_width = require_map(&mut archive, NPZ_WIDTH, (height, width))?;
        HeatMaps::from_raw(height, width, pos, cos, sin, raw_width, width_scale)?
    } else {
        return Err(PinceError::MapsReadError(format!(
            "{}: expected arrays ({}, {}, {}) or ({}, {}, {}, {})",
            path.display(),
            NPZ_QUALITY,
            NPZ_ANGLE,
            NPZ_WIDTH,
            NPZ_POS,
            NPZ_COS,
            NPZ_SIN,
            NPZ_WIDTH
        )));
    };

    let rotation = read_scalar(&mut archive, NPZ_ROTATION, 0.0)?;
    let zoom = read_scalar(&mut archive, NPZ_ZOOM, 1.0)?;

    if !(zoom > 0.0 && zoom.is_finite()) || !rotation.is_finite() {
        return Err(PinceError::InvalidInput(format!(
            "{}: zoom must be positive and rotation finite",
            path.display()
        )));
    }

    Ok(Prediction {
        maps,
        rotation,
        zoom,
    })
}

fn write_array<W: io::Write + Seek, T: npyz::AutoSerialize + Copy>(
    zip: &mut zip::ZipWriter<W>,
    name: &str,
    shape: &[u64],
    data: &[T],
) -> Result<(), PinceError> {
    zip.start_file::<_, ExtendedFileOptions>(
        npz::file_name_from_array_name(name),
        Default::default(),
    )
    .map_err(|_| PinceError::MapsWriteError)?;

    let mut writer = npyz::WriteOptions::new()
        .default_dtype()
        .shape(shape)
        .writer(zip)
        .begin_nd()
        .map_err(|_| PinceError::MapsWriteError)?;

    writer
        .extend(data.iter().copied())
        .map_err(|_| PinceError::MapsWriteError)?;

    writer.finish().map_err(|_| PinceError::MapsWriteError)
}

/// Write post-processed heat maps and their input transform to a .npz file
///
/// The output can be read back with [`read_prediction_npz`].
///
/// # Arguments
///
/// * `path` - Path to output .npz file
/// * `prediction` - Heat maps with rotation and zoom
pub fn write_prediction_npz<P: AsRef<Path>>(
    path: P,
    prediction: &Prediction,
) -> Result<(), PinceError> {
    let file = io::BufWriter::new(File::create(path).map_err(|_| PinceError::MapsWriteError)?);
    let mut zip = zip::ZipWriter::new(file);

    let maps = &prediction.maps;
    let shape = [maps.height() as u64, maps.width() as u64];

    write_array(&mut zip, NPZ_QUALITY, &shape, maps.quality())?;
    write_array(&mut zip, NPZ_ANGLE, &shape, maps.angle())?;
    write_array(&mut zip, NPZ_WIDTH, &shape, maps.width_map())?;
    write_array(&mut zip, NPZ_ROTATION, &[], &[prediction.rotation])?;
    write_array(&mut zip, NPZ_ZOOM, &[], &[prediction.zoom])?;

    zip.finish().map_err(|_| PinceError::MapsWriteError)?;

    Ok(())
}
