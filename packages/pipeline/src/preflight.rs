//! File-state validation run before any content transfer.

use crate::{Error, FileStat, Identity};

/// Check that the target exists, is a regular file, fits the size cap, and
/// is readable and writable by `identity`.
///
/// Checks run in that order and fail fast on the first violation; a failure
/// here aborts the whole pipeline invocation before any content moves.
///
/// Access is granted if any of these holds for the three-digit `mode`:
/// - the identity owns the file and the owner digit permits read+write,
/// - the identity is in the file's group and the group digit permits
///   read+write,
/// - the other digit permits read+write.
pub fn preflight(
    path: &str,
    stat: Option<&FileStat>,
    identity: &Identity,
    max_file_size_mb: u64,
) -> Result<(), Error> {
    let stat = stat.ok_or_else(|| Error::NotFound {
        path: path.to_string(),
    })?;

    if !stat.is_file {
        return Err(Error::NotAFile {
            path: path.to_string(),
        });
    }

    if stat.size_bytes > max_file_size_mb * 1024 * 1024 {
        return Err(Error::TooLarge {
            path: path.to_string(),
            size_bytes: stat.size_bytes,
            max_file_size_mb,
        });
    }

    let owner_can_rw = digit_allows_rw(stat.mode / 100 % 10);
    let group_can_rw = digit_allows_rw(stat.mode / 10 % 10);
    let other_can_rw = digit_allows_rw(stat.mode % 10);

    let allowed = (stat.owner == identity.user && owner_can_rw)
        || (identity.in_group(&stat.group) && group_can_rw)
        || other_can_rw;
    if !allowed {
        log::debug!(
            "owner_can_rw [{}], group_can_rw [{}], other_can_rw [{}]",
            owner_can_rw,
            group_can_rw,
            other_can_rw
        );
        log::debug!(
            "user [{}], groups [{:?}], file owner [{}], file group [{}], mode [{}]",
            identity.user,
            identity.groups,
            stat.owner,
            stat.group,
            stat.mode
        );
        return Err(Error::Permission {
            path: path.to_string(),
            user: identity.user.clone(),
        });
    }

    Ok(())
}

/// A permission digit allows read+write iff both bits are set: 6 (rw-) or
/// 7 (rwx).
fn digit_allows_rw(digit: u32) -> bool {
    digit == 6 || digit == 7
}
