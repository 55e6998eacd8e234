//! Static tables and bit layout of the 64-bit densely packed decimal word.
//!
//! Everything here is `const`: the tables are computed by the compiler and
//! shared read-only by the codec and by the literal macros.

#![no_std]
#![warn(missing_docs, missing_debug_implementations, unused_crate_dependencies)]

/// Exponent bias of the 64-bit word.
pub const BIAS: i32 = 398;

/// Largest biased exponent the word can hold.
pub const MAX_BIASED_EXPONENT: i32 = 767;

/// Smallest unbiased exponent (`0 - BIAS`).
pub const MIN_EXPONENT: i32 = -BIAS;

/// Largest unbiased exponent (`MAX_BIASED_EXPONENT - BIAS`).
pub const MAX_EXPONENT: i32 = MAX_BIASED_EXPONENT - BIAS;

/// Number of decimal digits in a full coefficient.
pub const MAX_DIGITS: u32 = 16;

/// Largest coefficient, sixteen nines.
pub const MAX_COEFFICIENT: u64 = 9_999_999_999_999_999;

/// Bit 63.
pub const SIGN_MASK: u64 = 0x8000_0000_0000_0000;

/// Position of the 5-bit combination field (bits 58-62).
pub const COMBINATION_SHIFT: u32 = 58;

/// Position of the low 8 exponent bits (bits 50-57).
pub const EXPONENT_CONTINUATION_SHIFT: u32 = 50;

/// Mask of the coefficient continuation, five 10-bit declets (bits 0-49).
pub const COEFFICIENT_CONTINUATION_MASK: u64 = 0x0003_FFFF_FFFF_FFFF;

/// `0E0` with a positive sign.
pub const ZERO_BITS: u64 = 0x2238_0000_0000_0000;

/// Combination field to `(leading digit << 2) | exponent high bits`.
///
/// Codes 30 and 31 encode infinities and NaNs, which never reach the codec;
/// their slots hold zero.
pub const COMBINATION_FIELD: [u8; 32] = [
    0, 4, 8, 12, 16, 20, 24, 28, //
    1, 5, 9, 13, 17, 21, 25, 29, //
    2, 6, 10, 14, 18, 22, 26, 30, //
    32, 36, 33, 37, 34, 38, 0, 0,
];

/// Powers of ten that fit in a `u64` below `i64::MAX`.
pub const POWERS_OF_TEN: [u64; 19] = [
    1,
    10,
    100,
    1_000,
    10_000,
    100_000,
    1_000_000,
    10_000_000,
    100_000_000,
    1_000_000_000,
    10_000_000_000,
    100_000_000_000,
    1_000_000_000_000,
    10_000_000_000_000,
    100_000_000_000_000,
    1_000_000_000_000_000,
    10_000_000_000_000_000,
    100_000_000_000_000_000,
    1_000_000_000_000_000_000,
];

/// Declet (10-bit densely packed group) to three BCD digits.
///
/// Non-canonical declets decode to the same digits as their canonical twin.
pub const DPD_TO_BCD: [u16; 1024] = [
    0x000, 0x001, 0x002, 0x003, 0x004, 0x005, 0x006, 0x007,
    0x008, 0x009, 0x080, 0x081, 0x800, 0x801, 0x880, 0x881,
    0x010, 0x011, 0x012, 0x013, 0x014, 0x015, 0x016, 0x017,
    0x018, 0x019, 0x090, 0x091, 0x810, 0x811, 0x890, 0x891,
    0x020, 0x021, 0x022, 0x023, 0x024, 0x025, 0x026, 0x027,
    0x028, 0x029, 0x082, 0x083, 0x820, 0x821, 0x808, 0x809,
    0x030, 0x031, 0x032, 0x033, 0x034, 0x035, 0x036, 0x037,
    0x038, 0x039, 0x092, 0x093, 0x830, 0x831, 0x818, 0x819,
    0x040, 0x041, 0x042, 0x043, 0x044, 0x045, 0x046, 0x047,
    0x048, 0x049, 0x084, 0x085, 0x840, 0x841, 0x088, 0x089,
    0x050, 0x051, 0x052, 0x053, 0x054, 0x055, 0x056, 0x057,
    0x058, 0x059, 0x094, 0x095, 0x850, 0x851, 0x098, 0x099,
    0x060, 0x061, 0x062, 0x063, 0x064, 0x065, 0x066, 0x067,
    0x068, 0x069, 0x086, 0x087, 0x860, 0x861, 0x888, 0x889,
    0x070, 0x071, 0x072, 0x073, 0x074, 0x075, 0x076, 0x077,
    0x078, 0x079, 0x096, 0x097, 0x870, 0x871, 0x898, 0x899,
    0x100, 0x101, 0x102, 0x103, 0x104, 0x105, 0x106, 0x107,
    0x108, 0x109, 0x180, 0x181, 0x900, 0x901, 0x980, 0x981,
    0x110, 0x111, 0x112, 0x113, 0x114, 0x115, 0x116, 0x117,
    0x118, 0x119, 0x190, 0x191, 0x910, 0x911, 0x990, 0x991,
    0x120, 0x121, 0x122, 0x123, 0x124, 0x125, 0x126, 0x127,
    0x128, 0x129, 0x182, 0x183, 0x920, 0x921, 0x908, 0x909,
    0x130, 0x131, 0x132, 0x133, 0x134, 0x135, 0x136, 0x137,
    0x138, 0x139, 0x192, 0x193, 0x930, 0x931, 0x918, 0x919,
    0x140, 0x141, 0x142, 0x143, 0x144, 0x145, 0x146, 0x147,
    0x148, 0x149, 0x184, 0x185, 0x940, 0x941, 0x188, 0x189,
    0x150, 0x151, 0x152, 0x153, 0x154, 0x155, 0x156, 0x157,
    0x158, 0x159, 0x194, 0x195, 0x950, 0x951, 0x198, 0x199,
    0x160, 0x161, 0x162, 0x163, 0x164, 0x165, 0x166, 0x167,
    0x168, 0x169, 0x186, 0x187, 0x960, 0x961, 0x988, 0x989,
    0x170, 0x171, 0x172, 0x173, 0x174, 0x175, 0x176, 0x177,
    0x178, 0x179, 0x196, 0x197, 0x970, 0x971, 0x998, 0x999,
    0x200, 0x201, 0x202, 0x203, 0x204, 0x205, 0x206, 0x207,
    0x208, 0x209, 0x280, 0x281, 0x802, 0x803, 0x882, 0x883,
    0x210, 0x211, 0x212, 0x213, 0x214, 0x215, 0x216, 0x217,
    0x218, 0x219, 0x290, 0x291, 0x812, 0x813, 0x892, 0x893,
    0x220, 0x221, 0x222, 0x223, 0x224, 0x225, 0x226, 0x227,
    0x228, 0x229, 0x282, 0x283, 0x822, 0x823, 0x828, 0x829,
    0x230, 0x231, 0x232, 0x233, 0x234, 0x235, 0x236, 0x237,
    0x238, 0x239, 0x292, 0x293, 0x832, 0x833, 0x838, 0x839,
    0x240, 0x241, 0x242, 0x243, 0x244, 0x245, 0x246, 0x247,
    0x248, 0x249, 0x284, 0x285, 0x842, 0x843, 0x288, 0x289,
    0x250, 0x251, 0x252, 0x253, 0x254, 0x255, 0x256, 0x257,
    0x258, 0x259, 0x294, 0x295, 0x852, 0x853, 0x298, 0x299,
    0x260, 0x261, 0x262, 0x263, 0x264, 0x265, 0x266, 0x267,
    0x268, 0x269, 0x286, 0x287, 0x862, 0x863, 0x888, 0x889,
    0x270, 0x271, 0x272, 0x273, 0x274, 0x275, 0x276, 0x277,
    0x278, 0x279, 0x296, 0x297, 0x872, 0x873, 0x898, 0x899,
    0x300, 0x301, 0x302, 0x303, 0x304, 0x305, 0x306, 0x307,
    0x308, 0x309, 0x380, 0x381, 0x902, 0x903, 0x982, 0x983,
    0x310, 0x311, 0x312, 0x313, 0x314, 0x315, 0x316, 0x317,
    0x318, 0x319, 0x390, 0x391, 0x912, 0x913, 0x992, 0x993,
    0x320, 0x321, 0x322, 0x323, 0x324, 0x325, 0x326, 0x327,
    0x328, 0x329, 0x382, 0x383, 0x922, 0x923, 0x928, 0x929,
    0x330, 0x331, 0x332, 0x333, 0x334, 0x335, 0x336, 0x337,
    0x338, 0x339, 0x392, 0x393, 0x932, 0x933, 0x938, 0x939,
    0x340, 0x341, 0x342, 0x343, 0x344, 0x345, 0x346, 0x347,
    0x348, 0x349, 0x384, 0x385, 0x942, 0x943, 0x388, 0x389,
    0x350, 0x351, 0x352, 0x353, 0x354, 0x355, 0x356, 0x357,
    0x358, 0x359, 0x394, 0x395, 0x952, 0x953, 0x398, 0x399,
    0x360, 0x361, 0x362, 0x363, 0x364, 0x365, 0x366, 0x367,
    0x368, 0x369, 0x386, 0x387, 0x962, 0x963, 0x988, 0x989,
    0x370, 0x371, 0x372, 0x373, 0x374, 0x375, 0x376, 0x377,
    0x378, 0x379, 0x396, 0x397, 0x972, 0x973, 0x998, 0x999,
    0x400, 0x401, 0x402, 0x403, 0x404, 0x405, 0x406, 0x407,
    0x408, 0x409, 0x480, 0x481, 0x804, 0x805, 0x884, 0x885,
    0x410, 0x411, 0x412, 0x413, 0x414, 0x415, 0x416, 0x417,
    0x418, 0x419, 0x490, 0x491, 0x814, 0x815, 0x894, 0x895,
    0x420, 0x421, 0x422, 0x423, 0x424, 0x425, 0x426, 0x427,
    0x428, 0x429, 0x482, 0x483, 0x824, 0x825, 0x848, 0x849,
    0x430, 0x431, 0x432, 0x433, 0x434, 0x435, 0x436, 0x437,
    0x438, 0x439, 0x492, 0x493, 0x834, 0x835, 0x858, 0x859,
    0x440, 0x441, 0x442, 0x443, 0x444, 0x445, 0x446, 0x447,
    0x448, 0x449, 0x484, 0x485, 0x844, 0x845, 0x488, 0x489,
    0x450, 0x451, 0x452, 0x453, 0x454, 0x455, 0x456, 0x457,
    0x458, 0x459, 0x494, 0x495, 0x854, 0x855, 0x498, 0x499,
    0x460, 0x461, 0x462, 0x463, 0x464, 0x465, 0x466, 0x467,
    0x468, 0x469, 0x486, 0x487, 0x864, 0x865, 0x888, 0x889,
    0x470, 0x471, 0x472, 0x473, 0x474, 0x475, 0x476, 0x477,
    0x478, 0x479, 0x496, 0x497, 0x874, 0x875, 0x898, 0x899,
    0x500, 0x501, 0x502, 0x503, 0x504, 0x505, 0x506, 0x507,
    0x508, 0x509, 0x580, 0x581, 0x904, 0x905, 0x984, 0x985,
    0x510, 0x511, 0x512, 0x513, 0x514, 0x515, 0x516, 0x517,
    0x518, 0x519, 0x590, 0x591, 0x914, 0x915, 0x994, 0x995,
    0x520, 0x521, 0x522, 0x523, 0x524, 0x525, 0x526, 0x527,
    0x528, 0x529, 0x582, 0x583, 0x924, 0x925, 0x948, 0x949,
    0x530, 0x531, 0x532, 0x533, 0x534, 0x535, 0x536, 0x537,
    0x538, 0x539, 0x592, 0x593, 0x934, 0x935, 0x958, 0x959,
    0x540, 0x541, 0x542, 0x543, 0x544, 0x545, 0x546, 0x547,
    0x548, 0x549, 0x584, 0x585, 0x944, 0x945, 0x588, 0x589,
    0x550, 0x551, 0x552, 0x553, 0x554, 0x555, 0x556, 0x557,
    0x558, 0x559, 0x594, 0x595, 0x954, 0x955, 0x598, 0x599,
    0x560, 0x561, 0x562, 0x563, 0x564, 0x565, 0x566, 0x567,
    0x568, 0x569, 0x586, 0x587, 0x964, 0x965, 0x988, 0x989,
    0x570, 0x571, 0x572, 0x573, 0x574, 0x575, 0x576, 0x577,
    0x578, 0x579, 0x596, 0x597, 0x974, 0x975, 0x998, 0x999,
    0x600, 0x601, 0x602, 0x603, 0x604, 0x605, 0x606, 0x607,
    0x608, 0x609, 0x680, 0x681, 0x806, 0x807, 0x886, 0x887,
    0x610, 0x611, 0x612, 0x613, 0x614, 0x615, 0x616, 0x617,
    0x618, 0x619, 0x690, 0x691, 0x816, 0x817, 0x896, 0x897,
    0x620, 0x621, 0x622, 0x623, 0x624, 0x625, 0x626, 0x627,
    0x628, 0x629, 0x682, 0x683, 0x826, 0x827, 0x868, 0x869,
    0x630, 0x631, 0x632, 0x633, 0x634, 0x635, 0x636, 0x637,
    0x638, 0x639, 0x692, 0x693, 0x836, 0x837, 0x878, 0x879,
    0x640, 0x641, 0x642, 0x643, 0x644, 0x645, 0x646, 0x647,
    0x648, 0x649, 0x684, 0x685, 0x846, 0x847, 0x688, 0x689,
    0x650, 0x651, 0x652, 0x653, 0x654, 0x655, 0x656, 0x657,
    0x658, 0x659, 0x694, 0x695, 0x856, 0x857, 0x698, 0x699,
    0x660, 0x661, 0x662, 0x663, 0x664, 0x665, 0x666, 0x667,
    0x668, 0x669, 0x686, 0x687, 0x866, 0x867, 0x888, 0x889,
    0x670, 0x671, 0x672, 0x673, 0x674, 0x675, 0x676, 0x677,
    0x678, 0x679, 0x696, 0x697, 0x876, 0x877, 0x898, 0x899,
    0x700, 0x701, 0x702, 0x703, 0x704, 0x705, 0x706, 0x707,
    0x708, 0x709, 0x780, 0x781, 0x906, 0x907, 0x986, 0x987,
    0x710, 0x711, 0x712, 0x713, 0x714, 0x715, 0x716, 0x717,
    0x718, 0x719, 0x790, 0x791, 0x916, 0x917, 0x996, 0x997,
    0x720, 0x721, 0x722, 0x723, 0x724, 0x725, 0x726, 0x727,
    0x728, 0x729, 0x782, 0x783, 0x926, 0x927, 0x968, 0x969,
    0x730, 0x731, 0x732, 0x733, 0x734, 0x735, 0x736, 0x737,
    0x738, 0x739, 0x792, 0x793, 0x936, 0x937, 0x978, 0x979,
    0x740, 0x741, 0x742, 0x743, 0x744, 0x745, 0x746, 0x747,
    0x748, 0x749, 0x784, 0x785, 0x946, 0x947, 0x788, 0x789,
    0x750, 0x751, 0x752, 0x753, 0x754, 0x755, 0x756, 0x757,
    0x758, 0x759, 0x794, 0x795, 0x956, 0x957, 0x798, 0x799,
    0x760, 0x761, 0x762, 0x763, 0x764, 0x765, 0x766, 0x767,
    0x768, 0x769, 0x786, 0x787, 0x966, 0x967, 0x988, 0x989,
    0x770, 0x771, 0x772, 0x773, 0x774, 0x775, 0x776, 0x777,
    0x778, 0x779, 0x796, 0x797, 0x976, 0x977, 0x998, 0x999,
];

/// Encodes three BCD digits (`0x000..=0x999`) as a canonical declet.
///
/// The input must hold valid digits; other nibbles produce an unspecified
/// declet.
#[must_use]
pub const fn bcd_to_dpd(bcd: u16) -> u16 {
    let b = bcd & 0xFFF;
    // large-digit indicators of the hundreds, tens and units
    match b & 0x888 {
        0x000 => ((b >> 1) & 0x380) | (b & 0x70) | (b & 0x7),
        0x008 => ((b >> 1) & 0x380) | (b & 0x70) | 0x8 | (b & 1),
        0x080 => ((b >> 1) & 0x380) | ((b << 4) & 0x60) | (b & 0x10) | 0xA | (b & 1),
        0x800 => ((b << 7) & 0x300) | ((b >> 1) & 0x80) | (b & 0x70) | 0xC | (b & 1),
        0x880 => ((b << 7) & 0x300) | ((b >> 1) & 0x80) | (b & 0x10) | 0xE | (b & 1),
        0x808 => ((b << 3) & 0x300) | ((b >> 1) & 0x80) | 0x20 | (b & 0x10) | 0xE | (b & 1),
        0x088 => ((b >> 1) & 0x380) | 0x40 | (b & 0x10) | 0xE | (b & 1),
        _ => ((b >> 1) & 0x80) | 0x60 | (b & 0x10) | 0xE | (b & 1),
    }
}

/// Builds the combination field from a leading digit (`0..=9`) and the two
/// high bits of the biased exponent.
#[must_use]
pub const fn combination_field(leading_digit: u8, exponent_high: u8) -> u8 {
    let exponent_high = exponent_high & 0x3;
    if leading_digit < 8 {
        (exponent_high << 3) | leading_digit
    } else {
        0x18 | (exponent_high << 1) | (leading_digit & 1)
    }
}

/// Leading digit recorded in a combination field.
#[must_use]
pub const fn leading_digit(combination: u8) -> u8 {
    COMBINATION_FIELD[(combination & 0x1F) as usize] >> 2
}

/// Two high exponent bits recorded in a combination field.
#[must_use]
pub const fn exponent_high_bits(combination: u8) -> u8 {
    COMBINATION_FIELD[(combination & 0x1F) as usize] & 0x3
}

/// Assembles a word from a sign, a 16-digit BCD coefficient and a biased
/// exponent.
///
/// Returns `None` when the BCD holds a nibble above 9 or the exponent lies
/// outside `0..=767`.
#[must_use]
pub const fn compose(negative: bool, bcd: u64, biased_exponent: i32) -> Option<u64> {
    if biased_exponent < 0 || biased_exponent > MAX_BIASED_EXPONENT || !is_valid_bcd(bcd) {
        return None;
    }

    let leading = (bcd >> 60) as u8;
    let combination = combination_field(leading, (biased_exponent >> 8) as u8);

    let mut continuation = 0u64;
    let mut group = 0;
    while group < 5 {
        let digits = ((bcd >> (12 * (4 - group))) & 0xFFF) as u16;
        continuation = (continuation << 10) | bcd_to_dpd(digits) as u64;
        group += 1;
    }

    let mut bits = ((combination as u64) << COMBINATION_SHIFT)
        | (((biased_exponent & 0xFF) as u64) << EXPONENT_CONTINUATION_SHIFT)
        | continuation;
    if negative {
        bits |= SIGN_MASK;
    }
    Some(bits)
}

/// Decodes the sixteen coefficient digits of a word as BCD, leading digit in
/// the top nibble.
#[must_use]
pub const fn coefficient_bcd(bits: u64) -> u64 {
    let mut continuation = bits & COEFFICIENT_CONTINUATION_MASK;
    let mut acc = 0u64;
    let mut group = 0;
    while group < 5 {
        let declet = ((continuation & 0x0003_FF00_0000_0000) >> 40) as usize;
        acc = (acc << 12) | DPD_TO_BCD[declet] as u64;
        continuation <<= 10;
        group += 1;
    }
    acc | ((leading_digit((bits >> COMBINATION_SHIFT) as u8) as u64) << 60)
}

/// Biased exponent of a word.
#[must_use]
pub const fn biased_exponent(bits: u64) -> i32 {
    let high = exponent_high_bits((bits >> COMBINATION_SHIFT) as u8) as i32;
    (high << 8) | ((bits >> EXPONENT_CONTINUATION_SHIFT) & 0xFF) as i32
}

/// `true` when every nibble of `bcd` is a decimal digit.
#[must_use]
pub const fn is_valid_bcd(bcd: u64) -> bool {
    // a nibble above 9 has bit 3 set together with bit 2 or bit 1
    let high = bcd & 0x8888_8888_8888_8888;
    let mid = (bcd & 0x6666_6666_6666_6666) << 1;
    (high & (mid | (mid << 1))) == 0
}

const _: () = {
    match compose(false, 0, BIAS) {
        Some(bits) if bits == ZERO_BITS => {}
        _ => panic!(),
    }
    if coefficient_bcd(ZERO_BITS) != 0 || biased_exponent(ZERO_BITS) != BIAS {
        panic!()
    }
};
