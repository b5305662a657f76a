/// Photo choices recorded on a generated CV.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhotoOptions<'a> {
    pub include_profile_picture: bool,
    pub cv_specific_photo_url: Option<&'a str>,
}

/// Picks the photo shown on the CV.
///
/// A per-CV override always wins, even when `include_profile_picture` is false.
/// Otherwise the profile photo is used only when inclusion was requested.
pub fn resolve_photo<'a>(
    cv_specific_photo_url: Option<&'a str>,
    include_profile_picture: bool,
    profile_picture_url: Option<&'a str>,
) -> Option<&'a str> {
    let present = |url: Option<&'a str>| url.map(str::trim).filter(|u| !u.is_empty());

    present(cv_specific_photo_url).or_else(|| {
        if include_profile_picture {
            present(profile_picture_url)
        } else {
            None
        }
    })
}
