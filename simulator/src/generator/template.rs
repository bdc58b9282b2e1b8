/// Deterministic tissue texture in wall-attached coordinates.
///
/// `angle` is the polar angle around the chamber in radians and `depth` the
/// normalised position across the wall; the same material point maps to the
/// same value in every frame, so the texture moves with the wall.
pub fn speckle(angle: f32, depth: f32, seed: u64) -> u8 {
    let angular_bin = ((angle + std::f32::consts::PI) * 36.0).floor() as i64 as u64;
    let depth_bin = (depth * 6.0).floor().clamp(0.0, 5.0) as u64;
    let mut hash = seed ^ 0x9e37_79b9_7f4a_7c15;
    hash ^= angular_bin.wrapping_mul(0xbf58_476d_1ce4_e5b9);
    hash = hash.rotate_left(27) ^ depth_bin.wrapping_mul(0x94d0_49bb_1331_11eb);
    hash ^= hash >> 31;
    (hash % 96) as u8
}
