//! Lyrics prompt construction

/// Build the lyrics prompt from selected headlines, in the order given.
///
/// The model is asked for original lyrics inspired by the themes rather
/// than quoting the headlines.
#[must_use]
pub fn build_lyrics_prompt<S: AsRef<str>>(headlines: &[S]) -> String {
    let joined = headlines
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(". ");

    format!(
        "Create creative song lyrics inspired by these news headlines. \
         Make it catchy and musical, with verses and a chorus. Headlines: {joined}\n\n\
         Create original lyrics that are inspired by these themes but don't directly \
         quote the headlines. Make it artistic and singable."
    )
}
