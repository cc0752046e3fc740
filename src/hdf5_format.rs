//! HDF5 file format for captured IMU records
//!
//! Layout:
//! * `metadata` group with `start_time`, `port`, `baud_rate`, `version`
//!   attributes
//! * `imu_data` group with a `timestamps` dataset (seconds since capture
//!   start) and one `f32` dataset per wire field (`accX` ... `temp`)

use crate::sample::{ImuSample, FIELD_NAMES};
use crate::{Result, StreamError};
use hdf5::types::VarLenUnicode;
use hdf5::{Dataset, File, Group};
use std::path::Path;

const FORMAT_VERSION: &str = "1.0";
const CHUNK_SIZE: usize = 1024;

/// Decoded sample with capture timestamp
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimestampedSample {
    pub timestamp: f64, // Seconds since collection start
    pub sample: ImuSample,
}

/// Metadata stored in HDF5 file
#[derive(Debug, Clone)]
pub struct Metadata {
    pub start_time: String, // ISO 8601 timestamp
    pub port: String,
    pub baud_rate: u32,
    pub version: String,
}

fn storage_err<E: std::fmt::Display>(context: &str) -> impl Fn(E) -> StreamError + '_ {
    move |e| StreamError::Storage(format!("{}: {}", context, e))
}

fn to_vlu(value: &str) -> Result<VarLenUnicode> {
    value
        .parse::<VarLenUnicode>()
        .map_err(storage_err("Invalid string attribute"))
}

/// HDF5 writer for record capture
pub struct Hdf5Writer {
    file: File,
    timestamps: Dataset,
    fields: Vec<Dataset>,
    sample_count: usize,
}

impl Hdf5Writer {
    /// Create a new HDF5 file for capture
    ///
    /// # Arguments
    /// * `path` - File path
    /// * `port` - Serial device the records came from
    /// * `baud_rate` - Link speed
    pub fn create<P: AsRef<Path>>(path: P, port: &str, baud_rate: u32) -> Result<Self> {
        let file = File::create(path).map_err(storage_err("Failed to create HDF5 file"))?;

        let metadata_group = file
            .create_group("metadata")
            .map_err(storage_err("Failed to create metadata group"))?;

        let start_time = to_vlu(&chrono::Local::now().to_rfc3339())?;
        Self::write_string_attr(&metadata_group, "start_time", &start_time)?;
        Self::write_string_attr(&metadata_group, "port", &to_vlu(port)?)?;
        Self::write_string_attr(&metadata_group, "version", &to_vlu(FORMAT_VERSION)?)?;
        metadata_group
            .new_attr::<u32>()
            .create("baud_rate")
            .and_then(|attr| attr.write_scalar(&baud_rate))
            .map_err(storage_err("Failed to write baud_rate"))?;

        let data_group = file
            .create_group("imu_data")
            .map_err(storage_err("Failed to create imu_data group"))?;

        let timestamps = Self::create_dataset::<f64>(&data_group, "timestamps")?;
        let fields = FIELD_NAMES
            .iter()
            .map(|name| Self::create_dataset::<f32>(&data_group, name))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            file,
            timestamps,
            fields,
            sample_count: 0,
        })
    }

    fn write_string_attr(group: &Group, name: &str, value: &VarLenUnicode) -> Result<()> {
        group
            .new_attr::<VarLenUnicode>()
            .create(name)
            .and_then(|attr| attr.write_scalar(value))
            .map_err(|e| StreamError::Storage(format!("Failed to write {}: {}", name, e)))
    }

    /// Create a resizable, chunked, compressed dataset
    fn create_dataset<T: hdf5::H5Type>(group: &Group, name: &str) -> Result<Dataset> {
        group
            .new_dataset::<T>()
            .shape((0..,))
            .chunk((CHUNK_SIZE,))
            .deflate(4)
            .create(name)
            .map_err(|e| StreamError::Storage(format!("Failed to create dataset {}: {}", name, e)))
    }

    /// Append a batch of samples
    pub fn append_batch(&mut self, samples: &[TimestampedSample]) -> Result<()> {
        if samples.is_empty() {
            return Ok(());
        }

        let new_size = self.sample_count + samples.len();

        let timestamps: Vec<f64> = samples.iter().map(|s| s.timestamp).collect();
        Self::append_to_dataset(&self.timestamps, new_size, &timestamps)?;

        let rows: Vec<[f32; 10]> = samples.iter().map(|s| s.sample.values()).collect();
        for (column, dataset) in self.fields.iter().enumerate() {
            let values: Vec<f32> = rows.iter().map(|row| row[column]).collect();
            Self::append_to_dataset(dataset, new_size, &values)?;
        }

        self.sample_count = new_size;
        Ok(())
    }

    fn append_to_dataset<T: hdf5::H5Type>(dataset: &Dataset, new_size: usize, data: &[T]) -> Result<()> {
        dataset
            .resize((new_size,))
            .map_err(storage_err("Failed to resize dataset"))?;

        let start = new_size - data.len();
        dataset
            .write_slice(data, start..)
            .map_err(storage_err("Failed to write to dataset"))?;

        Ok(())
    }

    /// Flush data to disk
    pub fn flush(&mut self) -> Result<()> {
        self.file.flush().map_err(storage_err("Failed to flush HDF5 file"))
    }

    /// Get current sample count
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }
}

/// HDF5 reader for captured records
pub struct Hdf5Reader {
    #[allow(dead_code)]
    file: File,
    timestamps: Dataset,
    fields: Vec<Dataset>,
    metadata: Metadata,
}

impl Hdf5Reader {
    /// Open an existing capture file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path).map_err(storage_err("Failed to open HDF5 file"))?;
        let metadata = Self::read_metadata(&file)?;

        let data_group = file
            .group("imu_data")
            .map_err(storage_err("Failed to open imu_data group"))?;
        let timestamps = data_group
            .dataset("timestamps")
            .map_err(storage_err("Failed to open timestamps dataset"))?;
        let fields = FIELD_NAMES
            .iter()
            .map(|name| {
                data_group
                    .dataset(name)
                    .map_err(|e| StreamError::Storage(format!("Failed to open {} dataset: {}", name, e)))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            file,
            timestamps,
            fields,
            metadata,
        })
    }

    fn read_metadata(file: &File) -> Result<Metadata> {
        let group = file
            .group("metadata")
            .map_err(storage_err("Failed to open metadata group"))?;

        let read_string = |name: &str| -> Result<String> {
            group
                .attr(name)
                .and_then(|attr| attr.read_scalar::<VarLenUnicode>())
                .map(|s| s.to_string())
                .map_err(|e| StreamError::Storage(format!("Failed to read {}: {}", name, e)))
        };

        let baud_rate = group
            .attr("baud_rate")
            .and_then(|attr| attr.read_scalar::<u32>())
            .map_err(storage_err("Failed to read baud_rate"))?;

        Ok(Metadata {
            start_time: read_string("start_time")?,
            port: read_string("port")?,
            baud_rate,
            version: read_string("version")?,
        })
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Get total number of samples in file
    pub fn get_total_samples(&self) -> usize {
        self.timestamps.size()
    }

    /// Read a range of samples
    pub fn read_range(&self, start: usize, count: usize) -> Result<Vec<TimestampedSample>> {
        let total = self.get_total_samples();
        if start >= total {
            return Ok(Vec::new());
        }
        let end = start + count.min(total - start);

        let timestamps: Vec<f64> = self
            .timestamps
            .read_slice_1d(start..end)
            .map_err(storage_err("Failed to read timestamps"))?
            .to_vec();

        let mut columns = Vec::with_capacity(self.fields.len());
        for dataset in &self.fields {
            let column: Vec<f32> = dataset
                .read_slice_1d(start..end)
                .map_err(storage_err("Failed to read field"))?
                .to_vec();
            columns.push(column);
        }

        let samples = timestamps
            .into_iter()
            .enumerate()
            .map(|(row, timestamp)| {
                let v = |column: usize| columns[column][row];
                TimestampedSample {
                    timestamp,
                    sample: ImuSample {
                        acc_x: v(0),
                        acc_y: v(1),
                        acc_z: v(2),
                        gyr_x: v(3),
                        gyr_y: v(4),
                        gyr_z: v(5),
                        mag_x: v(6),
                        mag_y: v(7),
                        mag_z: v(8),
                        temp: v(9),
                    },
                }
            })
            .collect();

        Ok(samples)
    }
}
