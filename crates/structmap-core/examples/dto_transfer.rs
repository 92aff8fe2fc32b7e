//! Move an order between a wire shape and a domain shape
//!
//! Run with `cargo run -p structmap-core --example dto_transfer`.

use structmap_core::{map, FieldDef, Key, MapOptions, Result, TypeId, Types, Value};

fn main() -> Result<()> {
    let mut types = Types::new();
    let notes_ty = types.map(TypeId::STRING, TypeId::STRING)?;

    // Wire shape
    let line_dto = types.structure(
        "LineDto",
        [
            FieldDef::public("Sku", TypeId::STRING),
            FieldDef::public("Quantity", TypeId::INT),
        ],
    )?;
    let lines_dto = types.sequence(line_dto);
    let order_dto = types.structure(
        "OrderDto",
        [
            FieldDef::public("Id", TypeId::UINT64),
            FieldDef::public("Lines", lines_dto),
            FieldDef::public("Notes", notes_ty),
        ],
    )?;

    // Domain shape, with bookkeeping the wire never carries
    let audit = types.structure("Audit", [FieldDef::public("Revision", TypeId::INT)])?;
    let audit_ptr = types.pointer(audit);
    let line = types.structure(
        "Line",
        [
            FieldDef::public("Sku", TypeId::STRING),
            FieldDef::public("Quantity", TypeId::INT),
            FieldDef::private("reserved", TypeId::BOOL),
        ],
    )?;
    let lines = types.sequence(line);
    let lines_ptr = types.pointer(lines);
    let order = types.structure(
        "Order",
        [
            FieldDef::embedded(audit_ptr),
            FieldDef::public("Id", TypeId::UINT64),
            FieldDef::public("Lines", lines_ptr),
            FieldDef::public("Notes", notes_ty),
        ],
    )?;
    let order_ptr = types.pointer(order);

    let wire_lines = types.new_sequence(
        lines_dto,
        [
            types.new_struct(line_dto, [("Sku", Value::string("A-1")), ("Quantity", Value::int(2))])?,
            types.new_struct(line_dto, [("Sku", Value::string("B-7")), ("Quantity", Value::int(1))])?,
        ],
    )?;
    let notes = types.new_map(notes_ty, [(Key::from("gift"), Value::string("yes"))])?;
    let incoming = types.new_struct(
        order_dto,
        [
            ("Id", Value::uint64(1042)),
            ("Lines", wire_lines),
            ("Notes", notes),
        ],
    )?;

    let domain = types.new_pointer(order_ptr, types.zero(order)?)?;
    map(&types, Some(&incoming), Some(&domain), &[MapOptions::loose()])?;
    println!("domain order: {}", render(&types, &domain));

    // Strict mode refuses to leave domain-only fields unfilled.
    let back = types.new_pointer(order_ptr, types.zero(order)?)?;
    if let Err(err) = map(&types, Some(&incoming), Some(&back), &[MapOptions::strict()]) {
        println!("strict mapping rejected: {}", err);
    }

    Ok(())
}

fn render(types: &Types, value: &Value) -> String {
    serde_json::to_string_pretty(&types.view(value)).unwrap_or_else(|err| err.to_string())
}
