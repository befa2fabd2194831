//! Reference frames offered by the HTDP frame menu, in menu order.

/// `(menu index, label)` pairs exactly as the engine prints them.
pub const FRAME_MENU: &[(u32, &str)] = &[
    (1, "NAD_83(2011/CORS96/2007)"),
    (2, "NAD_83(PA11/PACP00)"),
    (3, "NAD_83(MA11/MARP00)"),
    (4, "WGS72"),
    (5, "WGS84 original (Transit)"),
    (6, "WGS84(G730)"),
    (7, "WGS84(G873)"),
    (8, "WGS84(G1150)"),
    (9, "WGS84(G1674)"),
    (10, "WGS84(G1762)"),
    (11, "WGS84(G2139)"),
    (12, "WGS84(G2296)"),
    (13, "ITRF88"),
    (14, "ITRF89"),
    (15, "ITRF90"),
    (16, "ITRF91"),
    (17, "ITRF92"),
    (18, "ITRF93"),
    (19, "ITRF94"),
    (20, "ITRF96"),
    (21, "ITRF97"),
    (22, "ITRF2000 or IGS00/IGb00"),
    (23, "ITRF2005 or IGS05"),
    (24, "ITRF2008 or IGS08/IGb08"),
    (25, "ITRF2014 or IGS14/IGb14"),
    (26, "ITRF2020 or IGS20/IGb20"),
];
