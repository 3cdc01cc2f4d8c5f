// MediaPipe face mesh indices. "Left"/"right" refer to the subject, so the
// subject's right eye appears on the image-left side.

/// Subject's right eye in EAR order `p1..p6`: outer corner, upper lid (2),
/// inner corner, lower lid (2). Pairs `(p2, p6)` and `(p3, p5)` are vertical.
pub const RIGHT_EYE_EAR: [usize; 6] = [33, 160, 158, 133, 153, 144];

/// Subject's left eye in EAR order `p1..p6`: inner corner, upper lid (2),
/// outer corner, lower lid (2).
pub const LEFT_EYE_EAR: [usize; 6] = [362, 385, 387, 263, 373, 380];

pub const NOSE_TIP: usize = 1;
pub const RIGHT_EYE_OUTER: usize = 33;
pub const LEFT_EYE_OUTER: usize = 263;

/// Outer lip contour.
pub const MOUTH_OUTER: [usize; 20] = [
    61, 146, 91, 181, 84, 17, 314, 405, 321, 375, 291, 185, 40, 39, 37, 0, 267, 269, 270, 409,
];

/// Mouth corner on the image-left side.
pub const MOUTH_LEFT_CORNER: usize = 61;
/// Mouth corner on the image-right side.
pub const MOUTH_RIGHT_CORNER: usize = 291;
pub const UPPER_LIP_CENTER: usize = 0;
pub const LOWER_LIP_CENTER: usize = 17;

/// Frames shorter than this are dropped by the blink detector.
pub const BLINK_MIN_LANDMARKS: usize = 400;
