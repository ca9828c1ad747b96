//! Small synthetic fabrics for router tests.

use weave_design::{Design, Instance};
use weave_device::{
    ConnDirection, Device, DeviceBuilder, ElementConn, PinDirection, PrimitiveDef, RoutingElement,
    SiteId, TileId, WireId,
};

pub(crate) const DIRS: [(char, i64, i64); 4] = [('E', 1, 0), ('W', -1, 0), ('N', 0, 1), ('S', 0, -1)];

pub(crate) fn tile_wire(device: &Device, tile: &str, wire: &str) -> (TileId, WireId) {
    (
        device.tile_by_name(tile).unwrap(),
        device.wire_by_name(wire).unwrap(),
    )
}

pub(crate) fn int_tile(x: u32, y: u32) -> String {
    format!("INT_X{x}Y{y}")
}

pub(crate) fn slice_site(device: &Device, x: u32, y: u32) -> SiteId {
    device.site_by_name(&format!("SLICE_X{x}Y{y}")).unwrap()
}

fn conn(element: &str, direction: ConnDirection) -> ElementConn {
    ElementConn {
        element: element.to_string(),
        direction,
    }
}

/// `I0` feeds `LUT` which drives `O`; `I1` feeds `FFMUX` which also drives `O`.
pub(crate) fn slice_def() -> PrimitiveDef {
    PrimitiveDef {
        primitive_type: "SLICE".into(),
        elements: vec![
            RoutingElement::Pin {
                name: "I0".into(),
                direction: PinDirection::Input,
                conns: vec![conn("LUT", ConnDirection::Forward)],
            },
            RoutingElement::Pin {
                name: "I1".into(),
                direction: PinDirection::Input,
                conns: vec![conn("FFMUX", ConnDirection::Forward)],
            },
            RoutingElement::Internal {
                name: "LUT".into(),
                conns: vec![
                    conn("I0", ConnDirection::Backward),
                    conn("O", ConnDirection::Forward),
                ],
            },
            RoutingElement::Internal {
                name: "FFMUX".into(),
                conns: vec![
                    conn("I1", ConnDirection::Backward),
                    conn("O", ConnDirection::Forward),
                ],
            },
            RoutingElement::Pin {
                name: "O".into(),
                direction: PinDirection::Output,
                conns: vec![
                    conn("LUT", ConnDirection::Backward),
                    conn("FFMUX", ConnDirection::Backward),
                ],
            },
        ],
    }
}

/// A `width` x `height` island fabric with `tracks` single-length wires per direction.
///
/// Each tile holds a SLICE (`O` on `OUT`, `I0`/`I1` on `IMUX0`/`IMUX1`) and a
/// TIEOFF (`HARD0`/`HARD1` on `TIE0`/`TIE1`). `{d}BEG{k}` is hardwired to the
/// neighbour's `{d}END{k}`. Switchbox PIPs go from every `END` and from `OUT`,
/// `TIE0`, `TIE1` to every `BEG` of the same track, and from every `END` to
/// both `IMUX` wires. `IMUX0 -> OUT` is a routethrough PIP.
pub(crate) fn grid_device(width: u32, height: u32, tracks: u32) -> Device {
    let mut b = DeviceBuilder::new("grid", "grid-test");
    let mut tiles = Vec::new();
    for y in 0..height {
        for x in 0..width {
            tiles.push(b.tile(&int_tile(x, y), x, y));
        }
    }
    let at = |x: i64, y: i64| -> Option<TileId> {
        if x < 0 || y < 0 || x >= i64::from(width) || y >= i64::from(height) {
            None
        } else {
            Some(tiles[(y as u32 * width + x as u32) as usize])
        }
    };

    for y in 0..height {
        for x in 0..width {
            let Some(tile) = at(i64::from(x), i64::from(y)) else {
                continue;
            };
            for k in 0..tracks {
                for (d, dx, dy) in DIRS {
                    let beg = format!("{d}BEG{k}");
                    if let Some(next) = at(i64::from(x) + dx, i64::from(y) + dy) {
                        b.hardwire(tile, &beg, next, &format!("{d}END{k}"));
                    }
                    b.pip(tile, "OUT", &beg);
                    b.pip(tile, "TIE0", &beg);
                    b.pip(tile, "TIE1", &beg);
                }
                for (d, _, _) in DIRS {
                    let end = format!("{d}END{k}");
                    for (d2, _, _) in DIRS {
                        b.pip(tile, &end, &format!("{d2}BEG{k}"));
                    }
                    b.pip(tile, &end, "IMUX0");
                    b.pip(tile, &end, "IMUX1");
                }
            }
            b.pip(tile, "IMUX0", "OUT");
            b.site(
                &format!("SLICE_X{x}Y{y}"),
                tile,
                "SLICE",
                &[
                    ("O", "OUT", PinDirection::Output),
                    ("I0", "IMUX0", PinDirection::Input),
                    ("I1", "IMUX1", PinDirection::Input),
                ],
            );
            b.site(
                &format!("TIEOFF_X{x}Y{y}"),
                tile,
                "TIEOFF",
                &[
                    ("HARD0", "TIE0", PinDirection::Output),
                    ("HARD1", "TIE1", PinDirection::Output),
                ],
            );
        }
    }
    b.primitive_def(slice_def());
    b.build().unwrap()
}

/// Places a SLICE instance named `name` at `(x, y)`.
pub(crate) fn place_slice(design: &mut Design, device: &Device, name: &str, x: u32, y: u32) {
    design
        .add_instance(Instance::placed(name, "SLICE", slice_site(device, x, y)))
        .unwrap();
}
