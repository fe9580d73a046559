//! Little-endian wire helpers shared by the concrete serializers.

use crate::error::{CoreError, CoreResult};
use crate::scene::{PropertyMap, PropertyValue};
use scenedoc_vfs::DocStream;

pub(crate) fn write_u8(stream: &mut dyn DocStream, v: u8) -> CoreResult<()> {
    stream.write_all_buf(&[v])?;
    Ok(())
}

pub(crate) fn write_u16(stream: &mut dyn DocStream, v: u16) -> CoreResult<()> {
    stream.write_all_buf(&v.to_le_bytes())?;
    Ok(())
}

pub(crate) fn write_u32(stream: &mut dyn DocStream, v: u32) -> CoreResult<()> {
    stream.write_all_buf(&v.to_le_bytes())?;
    Ok(())
}

pub(crate) fn write_i64(stream: &mut dyn DocStream, v: i64) -> CoreResult<()> {
    stream.write_all_buf(&v.to_le_bytes())?;
    Ok(())
}

pub(crate) fn write_f32(stream: &mut dyn DocStream, v: f32) -> CoreResult<()> {
    stream.write_all_buf(&v.to_le_bytes())?;
    Ok(())
}

pub(crate) fn write_f64(stream: &mut dyn DocStream, v: f64) -> CoreResult<()> {
    stream.write_all_buf(&v.to_le_bytes())?;
    Ok(())
}

pub(crate) fn write_bool(stream: &mut dyn DocStream, v: bool) -> CoreResult<()> {
    write_u8(stream, u8::from(v))
}

pub(crate) fn write_str(stream: &mut dyn DocStream, v: &str) -> CoreResult<()> {
    let bytes = v.as_bytes();
    let len = u16::try_from(bytes.len()).unwrap_or(u16::MAX);
    write_u16(stream, len)?;
    stream.write_all_buf(&bytes[..len as usize])?;
    Ok(())
}

pub(crate) fn read_u8(stream: &mut dyn DocStream) -> CoreResult<u8> {
    let mut buf = [0u8; 1];
    read_exact(stream, &mut buf)?;
    Ok(buf[0])
}

pub(crate) fn read_u16(stream: &mut dyn DocStream) -> CoreResult<u16> {
    let mut buf = [0u8; 2];
    read_exact(stream, &mut buf)?;
    Ok(u16::from_le_bytes(buf))
}

pub(crate) fn read_u32(stream: &mut dyn DocStream) -> CoreResult<u32> {
    let mut buf = [0u8; 4];
    read_exact(stream, &mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

pub(crate) fn read_i64(stream: &mut dyn DocStream) -> CoreResult<i64> {
    let mut buf = [0u8; 8];
    read_exact(stream, &mut buf)?;
    Ok(i64::from_le_bytes(buf))
}

pub(crate) fn read_f32(stream: &mut dyn DocStream) -> CoreResult<f32> {
    let mut buf = [0u8; 4];
    read_exact(stream, &mut buf)?;
    Ok(f32::from_le_bytes(buf))
}

pub(crate) fn read_f64(stream: &mut dyn DocStream) -> CoreResult<f64> {
    let mut buf = [0u8; 8];
    read_exact(stream, &mut buf)?;
    Ok(f64::from_le_bytes(buf))
}

pub(crate) fn read_bool(stream: &mut dyn DocStream) -> CoreResult<bool> {
    Ok(read_u8(stream)? != 0)
}

pub(crate) fn read_str(stream: &mut dyn DocStream) -> CoreResult<String> {
    let len = read_u16(stream)? as usize;
    let mut buf = vec![0u8; len];
    read_exact(stream, &mut buf)?;
    String::from_utf8(buf).map_err(|_| CoreError::invalid_format("string is not valid UTF-8"))
}

pub(crate) fn write_f32x4(stream: &mut dyn DocStream, v: [f32; 4]) -> CoreResult<()> {
    for component in v {
        write_f32(stream, component)?;
    }
    Ok(())
}

pub(crate) fn read_f32x4(stream: &mut dyn DocStream) -> CoreResult<[f32; 4]> {
    Ok([
        read_f32(stream)?,
        read_f32(stream)?,
        read_f32(stream)?,
        read_f32(stream)?,
    ])
}

pub(crate) fn write_property(stream: &mut dyn DocStream, value: &PropertyValue) -> CoreResult<()> {
    write_u8(stream, value.type_tag())?;
    match value {
        PropertyValue::Bool(v) => write_bool(stream, *v),
        PropertyValue::Int(v) => write_i64(stream, *v),
        PropertyValue::Float(v) => write_f64(stream, *v),
        PropertyValue::Vec3(v) => {
            for component in v {
                write_f32(stream, *component)?;
            }
            Ok(())
        }
        PropertyValue::Color(v) => write_f32x4(stream, *v),
        PropertyValue::Text(v) | PropertyValue::AssetRef(v) => write_str(stream, v),
    }
}

pub(crate) fn read_property(stream: &mut dyn DocStream) -> CoreResult<PropertyValue> {
    let tag = read_u8(stream)?;
    Ok(match tag {
        0 => PropertyValue::Bool(read_bool(stream)?),
        1 => PropertyValue::Int(read_i64(stream)?),
        2 => PropertyValue::Float(read_f64(stream)?),
        3 => PropertyValue::Vec3([read_f32(stream)?, read_f32(stream)?, read_f32(stream)?]),
        4 => PropertyValue::Color(read_f32x4(stream)?),
        5 => PropertyValue::Text(read_str(stream)?),
        6 => PropertyValue::AssetRef(read_str(stream)?),
        other => {
            return Err(CoreError::invalid_format(format!(
                "unknown property type tag {other}"
            )))
        }
    })
}

/// Writes a property map in key order (`BTreeMap` iteration is already
/// sorted, which keeps saves deterministic).
pub(crate) fn write_property_map(
    stream: &mut dyn DocStream,
    properties: &PropertyMap,
) -> CoreResult<()> {
    let count = u32::try_from(properties.len()).unwrap_or(u32::MAX);
    write_u32(stream, count)?;
    for (name, value) in properties {
        write_str(stream, name)?;
        write_property(stream, value)?;
    }
    Ok(())
}

pub(crate) fn read_property_map(stream: &mut dyn DocStream) -> CoreResult<PropertyMap> {
    let count = read_u32(stream)?;
    let mut properties = PropertyMap::new();
    for _ in 0..count {
        let name = read_str(stream)?;
        let value = read_property(stream)?;
        properties.insert(name, value);
    }
    Ok(properties)
}

fn read_exact(stream: &mut dyn DocStream, buf: &mut [u8]) -> CoreResult<()> {
    stream
        .read_exact_buf(buf)
        .map_err(|_| CoreError::invalid_format("unexpected end of stream"))
}
