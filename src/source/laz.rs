use super::Decompress;
use crate::{raw, Error, Header, Result};
use laz::{LasZipDecompressor, LazVlr};
use log::debug;
use std::io::{Read, Seek, SeekFrom};

/// A [Decompress] over a laszip-compressed file.
#[allow(missing_debug_implementations)]
pub struct LazDecompressor<R: Read + Seek + Send + 'static> {
    decompressor: LasZipDecompressor<'static, R>,
}

impl<R: Read + Seek + Send + 'static> LazDecompressor<R> {
    /// Opens the compressed point data of a file.
    ///
    /// The laszip VLR is found by walking the VLRs after the header, then `read` is positioned
    /// at the first compressed chunk.
    pub fn new(mut read: R, header: &Header) -> Result<LazDecompressor<R>> {
        let laz_vlr = find_laz_vlr(&mut read, header)?;
        let _ = read.seek(SeekFrom::Start(u64::from(header.offset_to_point_data())))?;
        let decompressor = LasZipDecompressor::new(read, laz_vlr)?;
        Ok(LazDecompressor { decompressor })
    }
}

impl<R: Read + Seek + Send + 'static> Decompress for LazDecompressor<R> {
    fn decompress_next(&mut self, record: &mut [u8]) -> Result<()> {
        self.decompressor.decompress_one(record)?;
        Ok(())
    }
}

fn find_laz_vlr<R: Read + Seek>(read: &mut R, header: &Header) -> Result<LazVlr> {
    let _ = read.seek(SeekFrom::Start(u64::from(header.header_size())))?;
    for _ in 0..header.number_of_vlrs() {
        let vlr = raw::Vlr::read_from(&mut *read)?;
        if vlr.user_id() == LazVlr::USER_ID && vlr.record_id == LazVlr::RECORD_ID {
            debug!("found laszip vlr ({} bytes)", vlr.data.len());
            return Ok(LazVlr::from_buffer(&vlr.data)?);
        }
    }
    Err(Error::MissingLazVlr)
}
