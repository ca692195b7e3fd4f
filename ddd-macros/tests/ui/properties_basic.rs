use ddd_macros::properties;
use ddd_model::property::{PropertyAccess, RoutingValue, TypeInfo};
use uuid::Uuid;

#[properties]
#[derive(Debug, Clone)]
struct Seat {
    seat_id: Uuid,
    row: u8,
    #[property(rename = "seatLabel")]
    label: String,
    #[property(skip)]
    #[allow(dead_code)]
    notes: Vec<String>,
    holder: Option<String>,
}

#[properties]
struct Marker;

fn main() {
    assert_eq!(Seat::PROPERTY_NAMES, &["seat_id", "row", "seatLabel", "holder"]);
    assert!(Seat::property("notes").is_none());
    assert!(Seat::property("label").is_none());
    assert!(Marker::PROPERTY_NAMES.is_empty());

    let id = Uuid::new_v4();
    let seat = Seat {
        seat_id: id,
        row: 7,
        label: "A7".to_string(),
        notes: vec![],
        holder: None,
    };

    let info = TypeInfo::of::<Seat>();
    let row = info.property("row").expect("row property");
    assert_eq!(row.name(), "row");
    assert_eq!(row.value(&seat), Some(RoutingValue::Integer(7)));

    let seat_id = info.property("seat_id").expect("seat_id property");
    assert_eq!(seat_id.value(&seat), Some(RoutingValue::Text(id.to_string())));

    let label = info.property("seatLabel").expect("seatLabel property");
    assert_eq!(label.value(&seat), Some(RoutingValue::Text("A7".into())));

    let holder = info.property("holder").expect("holder property");
    assert_eq!(holder.value(&seat), Some(RoutingValue::Null));

    // 非本类型实例取不到值
    assert_eq!(row.value(&42_u32), None);
}
