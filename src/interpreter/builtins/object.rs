use super::*;

impl Interpreter {
    pub(crate) fn make_object_constructor(&mut self) -> ObjRef {
        // Calling and constructing behave alike: no argument (or a null-ish
        // one) makes a fresh object, anything else converts. An object
        // argument converts to itself.
        let ctor = self.make_function(
            |interp: &mut Interpreter, _this: &JsValue, args: &[JsValue]| {
                match args.first() {
                    None | Some(JsValue::Undefined) | Some(JsValue::Null) => {
                        let proto = interp.object_prototype.clone();
                        let obj = interp.allocate(JsObjectData::new("Object", Some(proto)));
                        Ok(object_handle(&obj))
                    }
                    Some(other) => {
                        let obj = interp.to_object(other)?;
                        Ok(object_handle(&obj))
                    }
                }
            },
            1,
        );
        ctor.borrow_mut().put_with_attributes(
            "prototype",
            object_handle(&self.object_prototype),
            PROTOTYPE_ATTR,
        );

        let to_string = self.make_function(
            |interp: &mut Interpreter, this: &JsValue, _args: &[JsValue]| {
                let obj = interp.expect_object(this)?;
                let class_name = obj.borrow().class_name.clone();
                Ok(JsValue::String(JsString::from_str(&format!(
                    "[object {class_name}]"
                ))))
            },
            0,
        );
        let value_of = self.make_function(
            |_interp: &mut Interpreter, this: &JsValue, _args: &[JsValue]| Ok(this.clone()),
            0,
        );

        let proto = self.object_prototype.clone();
        let mut p = proto.borrow_mut();
        p.put("constructor", object_handle(&ctor));
        p.put("toString", object_handle(&to_string));
        p.put("valueOf", object_handle(&value_of));
        drop(p);

        ctor
    }
}
