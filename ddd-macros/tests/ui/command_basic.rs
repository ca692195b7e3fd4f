use ddd_macros::command;
use ddd_model::message::{Command, CommandMessage};
use ddd_model::property::{PropertyAccess, RoutingValue};

#[command(name = "seat.reserve")]
#[derive(Debug)]
struct ReserveSeat {
    seat_no: u16,
    #[property(rename = "guest")]
    guest_name: String,
}

#[command]
struct ReleaseSeat {
    seat_no: u16,
}

fn main() {
    assert_eq!(ReserveSeat::NAME, "seat.reserve");
    assert_eq!(ReleaseSeat::NAME, "ReleaseSeat");
    assert_eq!(ReserveSeat::PROPERTY_NAMES, &["seat_no", "guest"]);

    let message = CommandMessage::new(ReserveSeat {
        seat_no: 12,
        guest_name: "Ada".to_string(),
    });
    assert_eq!(message.command_name(), "seat.reserve");

    let seat_no = message
        .payload_type()
        .property("seat_no")
        .expect("seat_no property");
    assert_eq!(seat_no.value(message.payload()), Some(RoutingValue::Integer(12)));

    let guest = ReserveSeat::property("guest").expect("guest property");
    assert_eq!(guest.value(message.payload()), Some(RoutingValue::Text("Ada".into())));

    let release = ReleaseSeat { seat_no: 3 };
    assert_eq!(release.seat_no, 3);
}
