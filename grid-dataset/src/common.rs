pub use anyhow::{bail, ensure, format_err, Context as _, Result};
pub use bbox::{prelude::*, HW, TLBR};
pub use indexmap::IndexMap;
pub use label::{Detection, GridLabel, GridLabelVector, NUM_CELLS};
pub use log::{debug, info, warn};
pub use noisy_float::prelude::*;
pub use once_cell::sync::Lazy;
pub use opencv::{
    core::{self as core_cv, Mat, Scalar, Vector},
    imgcodecs, imgproc,
    prelude::*,
};
pub use semver::{Version, VersionReq};
pub use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};
pub use std::{
    fmt,
    fs::{self, File},
    io::{self, BufWriter, Write as _},
    path::{Path, PathBuf},
    str::FromStr,
};
