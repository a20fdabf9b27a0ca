use anyhow::Result;
use rkyv::{api::high::HighValidator, bytecheck::CheckBytes, rancor, Archive};
use std::{marker::PhantomData, path::Path};

/// A memory-mapped rkyv archive of a `T`, validated when opened.
pub struct MemoryMappedRkyv<T: Archive> {
    mmap: memmap2::Mmap,
    _archive: PhantomData<T>,
}

impl<T> MemoryMappedRkyv<T>
where
    T: Archive,
    T::Archived: for<'a> CheckBytes<HighValidator<'a, rancor::Error>>,
{
    /// # Safety
    /// The file must not be modified for as long as it is mapped.
    pub unsafe fn open(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let mmap = unsafe { memmap2::Mmap::map(&file)? };
        let mapped = MemoryMappedRkyv {
            mmap,
            _archive: PhantomData,
        };
        mapped.archived()?;
        Ok(mapped)
    }

    pub fn archived(&self) -> Result<&T::Archived> {
        Ok(rkyv::access::<T::Archived, rancor::Error>(&self.mmap[..])?)
    }
}
