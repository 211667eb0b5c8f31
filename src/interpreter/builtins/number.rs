use super::*;
use crate::types::number_ops;

impl Interpreter {
    pub(crate) fn make_number_constructor(&mut self) -> ObjRef {
        let proto = self.allocate(JsObjectData::new(
            "Number",
            Some(self.object_prototype.clone()),
        ));
        proto.borrow_mut().internal_value = Some(JsValue::Number(0.0));
        self.number_prototype = Some(proto.clone());

        let ctor = self.make_raw_function();
        let construct_proto = proto.clone();
        {
            let mut c = ctor.borrow_mut();
            c.put_with_attributes(
                "length",
                JsValue::Number(1.0),
                PropertyAttributes::READ_ONLY
                    | PropertyAttributes::DONT_ENUM
                    | PropertyAttributes::DONT_DELETE,
            );
            c.call = Some(JsFunction::Native(Rc::new(
                |interp: &mut Interpreter, _this: &JsValue, args: &[JsValue]| {
                    let value = match args.first() {
                        Some(arg) => interp.to_number_value(arg)?,
                        None => 0.0,
                    };
                    Ok(JsValue::Number(value))
                },
            )));
            c.construct = Some(Construct::Native(Rc::new(
                move |interp: &mut Interpreter, _this: &JsValue, args: &[JsValue]| {
                    let value = match args.first() {
                        Some(arg) => interp.to_number_value(arg)?,
                        None => 0.0,
                    };
                    let obj = interp.allocate(JsObjectData::new(
                        "Number",
                        Some(construct_proto.clone()),
                    ));
                    obj.borrow_mut().internal_value = Some(JsValue::Number(value));
                    Ok(object_handle(&obj))
                },
            )));
            c.put_with_attributes("prototype", object_handle(&proto), PROTOTYPE_ATTR);
            c.put("MAX_VALUE", JsValue::Number(1.7976931348623157e308));
            c.put("MIN_VALUE", JsValue::Number(5e-324));
            c.put("NaN", JsValue::Number(f64::NAN));
            c.put("NEGATIVE_INFINITY", JsValue::Number(f64::NEG_INFINITY));
            c.put("POSITIVE_INFINITY", JsValue::Number(f64::INFINITY));
        }

        let to_string = self.make_function(
            |interp: &mut Interpreter, this: &JsValue, args: &[JsValue]| {
                let obj = interp.validate_type(this, "Number")?;
                let radix = match args.first() {
                    None | Some(JsValue::Undefined) => 10,
                    Some(arg) => number_ops::to_int32(interp.to_number_value(arg)?),
                };
                if !(2..=36).contains(&radix) {
                    return Err(EvalError::range_error(
                        format!("Invalid radix in Number.prototype.toString: {radix}"),
                        interp.stack_trace(None),
                    ));
                }
                if radix != 10 {
                    return Err(EvalError::not_implemented(
                        format!("Number.prototype.toString with radix {radix}"),
                        interp.stack_trace(None),
                    ));
                }
                let internal = obj
                    .borrow()
                    .internal_value
                    .clone()
                    .unwrap_or(JsValue::Number(0.0));
                Ok(JsValue::String(interp.to_string_value(&internal)?))
            },
            1,
        );
        let value_of = self.make_function(
            |interp: &mut Interpreter, this: &JsValue, _args: &[JsValue]| {
                let obj = interp.validate_type(this, "Number")?;
                let internal = obj.borrow().internal_value.clone();
                Ok(internal.unwrap_or(JsValue::Number(0.0)))
            },
            0,
        );

        let mut p = proto.borrow_mut();
        p.put("constructor", object_handle(&ctor));
        p.put("toString", object_handle(&to_string));
        p.put("valueOf", object_handle(&value_of));
        drop(p);

        ctor
    }
}
