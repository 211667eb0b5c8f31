use super::*;

impl Interpreter {
    pub(crate) fn make_boolean_constructor(&mut self) -> ObjRef {
        let proto = self.allocate(JsObjectData::new(
            "Boolean",
            Some(self.object_prototype.clone()),
        ));
        proto.borrow_mut().internal_value = Some(JsValue::Boolean(false));
        self.boolean_prototype = Some(proto.clone());

        // Calling coerces; constructing boxes
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
                |_interp: &mut Interpreter, _this: &JsValue, args: &[JsValue]| {
                    Ok(JsValue::Boolean(args.first().map(to_boolean).unwrap_or(false)))
                },
            )));
            c.construct = Some(Construct::Native(Rc::new(
                move |interp: &mut Interpreter, _this: &JsValue, args: &[JsValue]| {
                    let value = args.first().map(to_boolean).unwrap_or(false);
                    let obj = interp.allocate(JsObjectData::new(
                        "Boolean",
                        Some(construct_proto.clone()),
                    ));
                    obj.borrow_mut().internal_value = Some(JsValue::Boolean(value));
                    Ok(object_handle(&obj))
                },
            )));
            c.put_with_attributes("prototype", object_handle(&proto), PROTOTYPE_ATTR);
        }

        let to_string = self.make_function(
            |interp: &mut Interpreter, this: &JsValue, _args: &[JsValue]| {
                let obj = interp.validate_type(this, "Boolean")?;
                let truthy = matches!(
                    obj.borrow().internal_value,
                    Some(JsValue::Boolean(true))
                );
                Ok(JsValue::String(JsString::from_str(if truthy {
                    "true"
                } else {
                    "false"
                })))
            },
            0,
        );
        let value_of = self.make_function(
            |interp: &mut Interpreter, this: &JsValue, _args: &[JsValue]| {
                let obj = interp.validate_type(this, "Boolean")?;
                let internal = obj.borrow().internal_value.clone();
                Ok(internal.unwrap_or(JsValue::Boolean(false)))
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
