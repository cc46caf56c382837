//! Little-endian field accessors shared by the file formats.
//!
//! Every binary field is read or written through one of these helpers so
//! the on-disk layout never depends on in-memory struct layout.

use std::io::{self, Read, Write};

pub fn read_u8(reader: &mut impl Read) -> io::Result<u8> {
    let mut buf = [0u8; 1];
    reader.read_exact(&mut buf)?;
    Ok(buf[0])
}

pub fn read_u16(reader: &mut impl Read) -> io::Result<u16> {
    let mut buf = [0u8; 2];
    reader.read_exact(&mut buf)?;
    Ok(u16::from_le_bytes(buf))
}

pub fn read_i32(reader: &mut impl Read) -> io::Result<i32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

pub fn read_u32(reader: &mut impl Read) -> io::Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

/// Read three consecutive i32 values (x, y, z)
pub fn read_i32x3(reader: &mut impl Read) -> io::Result<[i32; 3]> {
    Ok([read_i32(reader)?, read_i32(reader)?, read_i32(reader)?])
}

pub fn read_array<const N: usize>(reader: &mut impl Read) -> io::Result<[u8; N]> {
    let mut buf = [0u8; N];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

/// Read exactly `len` bytes.
///
/// The buffer grows with the data actually present, so a bogus length in a
/// corrupt header fails with `UnexpectedEof` instead of a huge allocation.
pub fn read_bytes(reader: &mut impl Read, len: usize) -> io::Result<Vec<u8>> {
    let buf = read_up_to(reader, len)?;
    if buf.len() != len {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("expected {} bytes, got {}", len, buf.len()),
        ));
    }
    Ok(buf)
}

/// Read at most `len` bytes, stopping early at end of stream.
pub fn read_up_to(reader: &mut impl Read, len: usize) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    reader.by_ref().take(len as u64).read_to_end(&mut buf)?;
    Ok(buf)
}

pub fn write_u16(writer: &mut impl Write, v: u16) -> io::Result<()> {
    writer.write_all(&v.to_le_bytes())
}

pub fn write_i32(writer: &mut impl Write, v: i32) -> io::Result<()> {
    writer.write_all(&v.to_le_bytes())
}

pub fn write_i32x3(writer: &mut impl Write, v: [i32; 3]) -> io::Result<()> {
    write_i32(writer, v[0])?;
    write_i32(writer, v[1])?;
    write_i32(writer, v[2])?;
    Ok(())
}
