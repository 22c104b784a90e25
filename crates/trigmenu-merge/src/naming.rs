//! Deterministic names for merged steps and synthesized placeholders
//!
//! Placeholder names must come out identical across independent merge
//! calls, so everything here is a pure function of its inputs.

/// Removes a leading `StepN_` or `StepNN_` prefix, if present.
pub fn strip_step_prefix(name: &str) -> &str {
    let bytes = name.as_bytes();
    if !name.starts_with("Step") {
        return name;
    }
    let digits = bytes[4..].iter().take_while(|b| b.is_ascii_digit()).count();
    if (1..=2).contains(&digits) && bytes.get(4 + digits) == Some(&b'_') {
        &name[4 + digits + 1..]
    } else {
        name
    }
}

/// Removes a leading `merged_` prefix, if present.
pub fn strip_merged_prefix(name: &str) -> &str {
    name.strip_prefix("merged_").unwrap_or(name)
}

/// Strips the positional prefixes a step name picks up when merged,
/// so merging already merged chains stays idempotent.
pub fn strip_positional_prefixes(name: &str) -> &str {
    strip_merged_prefix(strip_step_prefix(name))
}

/// Name of a synthesized placeholder sequence:
/// `Empty<Group>Seq<N>_<signature>`.
pub fn empty_sequence_name(signature: &str, step_number: usize, alignment_group: &str) -> String {
    format!(
        "Empty{}Seq{}_{}",
        alignment_group,
        step_number,
        strip_step_prefix(signature)
    )
}

/// Name of a synthesized placeholder step covering several legs:
/// `Empty<Group>Align<N>_<sig>_<sig>...`.
pub fn empty_step_name(alignment_group: &str, step_number: usize, leg_signatures: &[String]) -> String {
    format!(
        "Empty{}Align{}_{}",
        alignment_group,
        step_number,
        leg_signatures.join("_")
    )
}

/// Name of a single padded leg slot inside a combined step:
/// `Empty<Group>Align<N>_<multiplicity><signature>[FS]`.
pub fn padded_step_name(
    alignment_group: &str,
    step_number: usize,
    multiplicity: u32,
    signature: &str,
    full_scan: bool,
) -> String {
    let fs = if full_scan { "FS" } else { "" };
    format!("Empty{alignment_group}Align{step_number}_{multiplicity}{signature}{fs}")
}
