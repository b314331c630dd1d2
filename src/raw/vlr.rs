use crate::Result;
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Read;

/// A raw VLR that maps directly onto the LAS specification.
#[derive(Clone, Debug, Default, PartialEq)]
#[allow(missing_docs)]
pub struct Vlr {
    pub reserved: u16,
    pub user_id: [u8; 16],
    pub record_id: u16,
    pub record_length_after_header: u16,
    pub description: [u8; 32],
    pub data: Vec<u8>,
}

impl Vlr {
    /// Reads a raw VLR.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io::Cursor;
    /// use lasband::raw::Vlr;
    /// let mut bytes = vec![0; 54];
    /// bytes[20] = 2;
    /// bytes.extend([7, 8]);
    /// let vlr = Vlr::read_from(Cursor::new(bytes)).unwrap();
    /// assert_eq!(vec![7, 8], vlr.data);
    /// ```
    pub fn read_from<R: Read>(mut read: R) -> Result<Vlr> {
        let reserved = read.read_u16::<LittleEndian>()?;
        let mut user_id = [0; 16];
        read.read_exact(&mut user_id)?;
        let record_id = read.read_u16::<LittleEndian>()?;
        let record_length_after_header = read.read_u16::<LittleEndian>()?;
        let mut description = [0; 32];
        read.read_exact(&mut description)?;
        let mut data = vec![0; usize::from(record_length_after_header)];
        read.read_exact(&mut data)?;
        Ok(Vlr {
            reserved,
            user_id,
            record_id,
            record_length_after_header,
            description,
            data,
        })
    }

    /// Returns the user id with its trailing nuls removed.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasband::raw::Vlr;
    /// let mut vlr = Vlr::default();
    /// vlr.user_id[..6].copy_from_slice(b"LASF_P");
    /// assert_eq!("LASF_P", vlr.user_id());
    /// ```
    pub fn user_id(&self) -> String {
        let end = self
            .user_id
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(self.user_id.len());
        String::from_utf8_lossy(&self.user_id[..end]).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn truncated_data() {
        let mut bytes = vec![0; 54];
        bytes[20] = 10;
        bytes.extend([1, 2, 3]);
        assert!(Vlr::read_from(Cursor::new(bytes)).is_err());
    }
}
